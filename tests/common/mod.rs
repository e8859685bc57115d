use inkwell::context::Context;

/// Run the whole pipeline over a source string and return the textual IR
pub fn run_pipeline(source: &str) -> String {
    let program = mila::parse(source).unwrap();
    let context = Context::create();
    let module = mila::compile(&context, &program).unwrap();
    module.verify().unwrap();
    module.print_to_string().to_string()
}
