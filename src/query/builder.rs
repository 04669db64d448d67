use bson::{Bson, Document};

use super::filter::merge_predicate;
use super::operator::Operator;
use super::predicate::compile_predicate;
use super::types::{CompiledRequest, FindOptions, Order};
use crate::errors::OdmError;
use crate::metadata::ClassMetadata;
use crate::session::{Cursor, Session};

/// Fluent builder accumulating a filter, projection, sort and cursor options for one class.
///
/// State is never reset implicitly: rebinding the class with [`Query::from`] keeps everything
/// accumulated so far, and every execution method recompiles from the current state.
///
/// ```ignore
/// let mut q = Query::for_class(&session, "Order")?;
/// q.where_("status", "open")?
///     .where_gte("amount", 100)?
///     .sort("createdAt", "desc")
///     .limit(20);
/// let orders = q.execute()?;
/// ```
pub struct Query<'a, S: Session> {
    session: &'a S,
    class: Option<ClassMetadata>,
    select: Vec<String>,
    filter: Document,
    sort: Document,
    limit: Option<i64>,
    skip: Option<i64>,
    hints: Vec<Document>,
    slave_okay: bool,
    snapshot: bool,
    immortal: bool,
}

impl<'a, S: Session> Query<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self {
            session,
            class: None,
            select: Vec::new(),
            filter: Document::new(),
            sort: Document::new(),
            limit: None,
            skip: None,
            hints: Vec::new(),
            slave_okay: false,
            snapshot: false,
            immortal: false,
        }
    }

    /// # Errors
    /// Propagates the session's failure to resolve `class_name`.
    pub fn for_class(session: &'a S, class_name: &str) -> Result<Self, OdmError> {
        let mut q = Self::new(session);
        q.from(class_name)?;
        Ok(q)
    }

    /// Binds the target class. Accumulated filter, projection and sort are kept.
    ///
    /// # Errors
    /// Propagates the session's failure to resolve `class_name`.
    pub fn from(&mut self, class_name: &str) -> Result<&mut Self, OdmError> {
        let meta = self.session.class_metadata(class_name)?;
        log::debug!("query bound to class {} (identifier `{}`)", meta.name, meta.identifier);
        self.class = Some(meta);
        Ok(self)
    }

    pub fn select<I, F>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_select(&mut self, field: impl Into<String>) -> &mut Self {
        self.select.push(field.into());
        self
    }

    /// Replaces the whole filter with a single predicate. On error the filter is left unchanged.
    ///
    /// # Errors
    /// `UnboundType` without a bound class, `InvalidIdentifier` when an identifier value cannot be
    /// coerced.
    pub fn where_(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        let (key, value) = self.compile(field, value.into())?;
        self.filter = Document::new();
        merge_predicate(&mut self.filter, key, value);
        Ok(self)
    }

    /// Adds a predicate, keeping the others. Operator mappings on the same field are unioned.
    ///
    /// # Errors
    /// `UnboundType` without a bound class, `InvalidIdentifier` when an identifier value cannot be
    /// coerced.
    pub fn add_where(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        let (key, value) = self.compile(field, value.into())?;
        merge_predicate(&mut self.filter, key, value);
        Ok(self)
    }

    fn compile(&self, field: &str, value: Bson) -> Result<(String, Bson), OdmError> {
        let class = self.class.as_ref().ok_or(OdmError::UnboundType)?;
        compile_predicate(class, field, value)
    }

    fn add_operator(&mut self, field: &str, op: Operator, operand: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_where(field, op.fragment(operand))
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_in<I, V>(&mut self, field: &str, values: I) -> Result<&mut Self, OdmError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.add_operator(field, Operator::In, to_array(values))
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_not_in<I, V>(&mut self, field: &str, values: I) -> Result<&mut Self, OdmError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.add_operator(field, Operator::Nin, to_array(values))
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_not_equal(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Ne, value)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_gt(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Gt, value)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_gte(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Gte, value)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_lt(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Lt, value)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_lte(&mut self, field: &str, value: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Lte, value)
    }

    /// Matches values strictly between `start` and `end`. Both bounds are exclusive.
    ///
    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_range(
        &mut self,
        field: &str,
        start: impl Into<Bson>,
        end: impl Into<Bson>,
    ) -> Result<&mut Self, OdmError> {
        let mut range = Operator::Gt.fragment(start);
        range.insert(Operator::Lt.token(), end.into());
        self.add_where(field, range)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_size(&mut self, field: &str, size: i64) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Size, size)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_exists(&mut self, field: &str, exists: bool) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Exists, exists)
    }

    /// `bson_type` is a numeric BSON type code or a type alias such as `"string"`.
    ///
    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_type(&mut self, field: &str, bson_type: impl Into<Bson>) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Type, bson_type)
    }

    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_all<I, V>(&mut self, field: &str, values: I) -> Result<&mut Self, OdmError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.add_operator(field, Operator::All, to_array(values))
    }

    /// Matches values where `value % divisor == remainder`.
    ///
    /// # Errors
    /// See [`Query::add_where`].
    pub fn where_mod(&mut self, field: &str, divisor: i64, remainder: i64) -> Result<&mut Self, OdmError> {
        self.add_operator(field, Operator::Mod, vec![divisor, remainder])
    }

    /// Replaces the sort spec with a single key.
    pub fn sort(&mut self, field: impl Into<String>, order: impl Into<Order>) -> &mut Self {
        self.sort = Document::new();
        self.add_sort(field, order)
    }

    pub fn add_sort(&mut self, field: impl Into<String>, order: impl Into<Order>) -> &mut Self {
        let order: Order = order.into();
        self.sort.insert(field.into(), order);
        self
    }

    /// Not validated here; the cursor decides what a negative limit means.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Not validated here; the cursor decides what a negative skip means.
    pub fn skip(&mut self, skip: i64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    pub fn hint(&mut self, key_pattern: Document) -> &mut Self {
        self.hints.push(key_pattern);
        self
    }

    pub fn slave_okay(&mut self, enabled: bool) -> &mut Self {
        self.slave_okay = enabled;
        self
    }

    pub fn snapshot(&mut self, enabled: bool) -> &mut Self {
        self.snapshot = enabled;
        self
    }

    pub fn immortal(&mut self, enabled: bool) -> &mut Self {
        self.immortal = enabled;
        self
    }

    /// Captures the current state as a request.
    ///
    /// # Errors
    /// `UnboundType` without a bound class.
    pub fn compile_request(&self) -> Result<CompiledRequest, OdmError> {
        let class = self.class.as_ref().ok_or(OdmError::UnboundType)?;
        let request = CompiledRequest {
            class_name: class.name.clone(),
            filter: self.filter.clone(),
            projection: self.select.clone(),
            options: FindOptions {
                sort: self.sort.clone(),
                limit: self.limit,
                skip: self.skip,
                hints: self.hints.clone(),
                slave_okay: self.slave_okay,
                snapshot: self.snapshot,
                immortal: self.immortal,
            },
        };
        crate::devlog!(
            "{}",
            serde_json::json!({
                "event": "compile",
                "class": request.class_name,
                "fields": request.filter.len(),
                "projection": request.projection.len(),
                "hints": request.options.hints.len(),
                "snapshot": request.options.snapshot,
            })
        );
        Ok(request)
    }

    /// Opens a cursor for the current state and configures it. The cursor is not executed.
    ///
    /// # Errors
    /// `UnboundType` without a bound class; any session or cursor error is returned unchanged.
    pub fn get_cursor(&self) -> Result<S::Cursor, OdmError> {
        let request = self.compile_request()?;
        log::debug!(
            "find {} filter={} fields={:?} sort={} limit={:?} skip={:?}",
            request.class_name,
            request.filter,
            request.projection,
            request.options.sort,
            request.options.limit,
            request.options.skip
        );
        let mut cursor = self.session.find(&request.class_name, &request.filter, &request.projection)?;
        request.options.apply_to(&mut cursor)?;
        Ok(cursor)
    }

    /// Runs the query and collects every result.
    ///
    /// # Errors
    /// See [`Query::get_cursor`]; also propagates result retrieval errors.
    pub fn execute(&self) -> Result<Vec<<S::Cursor as Cursor>::Item>, OdmError> {
        self.get_cursor()?.get_results()
    }

    /// Counts matching documents, applying limit and skip only when `include_limit_skip` is set.
    ///
    /// # Errors
    /// See [`Query::get_cursor`].
    pub fn count(&self, include_limit_skip: bool) -> Result<u64, OdmError> {
        self.get_cursor()?.count(include_limit_skip)
    }

    /// First result, or `None` when nothing matches.
    ///
    /// # Errors
    /// See [`Query::execute`].
    pub fn get_single_result(&self) -> Result<Option<<S::Cursor as Cursor>::Item>, OdmError> {
        Ok(self.execute()?.into_iter().next())
    }

    /// Live cursor for lazy consumption.
    ///
    /// # Errors
    /// See [`Query::get_cursor`].
    pub fn iterate(&self) -> Result<S::Cursor, OdmError> {
        self.get_cursor()
    }

    pub const fn session(&self) -> &'a S {
        self.session
    }

    pub const fn class(&self) -> Option<&ClassMetadata> {
        self.class.as_ref()
    }

    pub const fn filter(&self) -> &Document {
        &self.filter
    }

    pub fn projection(&self) -> &[String] {
        &self.select
    }

    pub const fn sort_spec(&self) -> &Document {
        &self.sort
    }

    pub fn hints(&self) -> &[Document] {
        &self.hints
    }

    pub const fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub const fn skip_value(&self) -> Option<i64> {
        self.skip
    }
}

fn to_array<I, V>(values: I) -> Bson
where
    I: IntoIterator<Item = V>,
    V: Into<Bson>,
{
    Bson::Array(values.into_iter().map(Into::into).collect())
}
