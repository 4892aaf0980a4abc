use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    causette::cli::main()
}
