use optree::{CommandLineParser, Mode, Opt};

fn main() {
    let mut program = CommandLineParser::new("bundled")
        .about("Lists ports, with tar style flags (ex: -alp 80 8000..8002).")
        .mode(Mode::Bundling)
        .map_keys_lower()
        .add(
            Opt::bool("all", false)
                .alias("a")
                .description("Include closed ports."),
        )
        .add(
            Opt::bool("long", false)
                .alias("l")
                .description("Use the long format."),
        )
        .add(
            Opt::ints("port")
                .alias("p")
                .args(1, 4)
                .description("Ports or ascending port ranges."),
        )
        .add(
            Opt::string_map("label")
                .alias("L")
                .description("Only ports carrying the label."),
        )
        .build();

    let parsed = program.parse();
    let long = parsed.bool("long") == Some(true);
    let labels = parsed.string_map("label").cloned().unwrap_or_default();

    for port in parsed.ints("port").unwrap_or_default() {
        if long {
            println!("port {port:>5} all={:?} labels={labels:?}", parsed.bool("all"));
        } else {
            println!("{port}");
        }
    }

    if !parsed.remaining().is_empty() {
        println!("ignored: {}", parsed.remaining().join(" "));
    }
}
