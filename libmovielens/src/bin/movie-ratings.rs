extern crate movielens;
extern crate util;

use movielens::*;
use util::output_error;

fn run() -> Result<()> {
    util::init_logger().chain_err(|| "Failed to initialise logging.")?;

    let matches = movielens::parse_command_line();
    movielens::run(&matches)
}

fn main() {
    if let Err(ref err) = run() {
        output_error(err);
        ::std::process::exit(1);
    }
}
