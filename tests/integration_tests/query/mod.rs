mod cursor_config_tests;
mod execute_tests;
