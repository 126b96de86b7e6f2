use hookup::{
    cli::{run, suggestion_for},
    utils::print_error,
};

fn main() {
    if let Err(error) = run() {
        print_error("hookup failed", &error.to_string(), suggestion_for(&error));
        std::process::exit(1);
    }
}
