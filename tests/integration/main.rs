mod cli_test;
mod pool_test;
