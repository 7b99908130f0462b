use mapnav::prelude::*;

/// Example of driving the navigation engine without any UI
///
/// Needs `STATIC_APIKEY`, `SEARCH_APIKEY`, and `GEOCODE_APIKEY` in the
/// environment; every gesture a shell would send is just an intent here.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("🗺️ mapnav headless example");
    println!("==========================");

    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(ConfigError::MissingKey(name)) => {
            println!("   Missing the {} environment variable.", name);
            println!("   Set STATIC_APIKEY, SEARCH_APIKEY, and GEOCODE_APIKEY first.");
            return Ok(());
        }
    };
    let mut controller = NavigationController::from_config(config);

    // Show Moscow city center with a pin.
    let outcome = controller
        .handle(NavigationIntent::SubmitCoordinates {
            latitude: "55.7539".to_string(),
            longitude: "37.6208".to_string(),
            pin: true,
        })
        .await?;
    report("submit coordinates", &outcome);

    // Walk the view around the way arrow keys and the mouse would.
    let gestures = [
        ("zoom in", NavigationIntent::Zoom(ZoomStep::In)),
        ("pan east", NavigationIntent::Pan(PanDirection::East)),
        ("click near the corner", NavigationIntent::ClickAt { x: 400.0, y: 100.0 }),
        ("toggle the dark theme", NavigationIntent::ToggleTheme),
    ];
    for (name, intent) in gestures {
        let outcome = controller.handle(intent).await?;
        report(name, &outcome);
    }

    // Resolving text fills the status line.
    let outcome = controller
        .handle(NavigationIntent::SubmitText {
            text: "Красная площадь".to_string(),
        })
        .await?;
    report("submit text", &outcome);
    if let Some(line) = controller.status_line() {
        println!("   📍 {}", line);
    }

    let outcome = controller.handle(NavigationIntent::Clear).await?;
    report("clear", &outcome);

    println!("\n✅ Done; the engine never touched a widget.");
    Ok(())
}

fn report(name: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Rendered { view, image } => println!(
            "   {} -> {} bytes for {} at z{}",
            name,
            image.len(),
            view.center.as_lon_lat(),
            view.zoom
        ),
        Outcome::Unchanged => println!("   {} -> view unchanged, no fetch", name),
        Outcome::Cleared => println!("   {} -> back to the placeholder", name),
    }
}
