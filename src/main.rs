use pathlang::console;
use pathlang::query::GraphRegistry;

fn main() -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut registry = GraphRegistry::new();
    console::run(
        &mut registry,
        stdin.lock(),
        std::io::stdout(),
        std::io::stderr(),
    )
}
