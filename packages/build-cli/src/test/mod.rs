mod cli_spec;
mod config_spec;
mod rewrite_spec;
