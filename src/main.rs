fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("ABDUCTION_CONFIG").unwrap_or_else(|_| "config.ini".to_string());
    abduction_scene::flow::run(config_path)
}
