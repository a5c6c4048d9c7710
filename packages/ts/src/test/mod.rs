mod config_spec;
mod transpile_spec;
