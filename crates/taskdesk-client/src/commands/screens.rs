use super::open_context;

pub fn run() -> anyhow::Result<()> {
    let ctx = open_context()?;
    let route = ctx.route();

    println!("State: {}", route.state());
    for screen in route.screens() {
        let marker = if *screen == route.landing() { "*" } else { " " };
        println!("  {marker} {}", screen.name());
    }
    Ok(())
}
