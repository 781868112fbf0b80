pub mod cli;

fn main() {
    cli::main();
}
