use optree::{CommandLineParser, Opt};

fn main() {
    let mut program = CommandLineParser::new("greeter")
        .about("Greets people, politely or otherwise.")
        .add(
            Opt::bool("verbose", false)
                .alias("v")
                .description("Explain what happened."),
        )
        .command("hello", |hello| {
            hello
                .about("Say hello.")
                .add(
                    Opt::string("name", "world")
                        .alias("n")
                        .env("GREETER_NAME")
                        .suggested_values(["alice", "bob"])
                        .description("Who to greet."),
                )
                .add(
                    Opt::int("times", 1)
                        .alias("t")
                        .description("How many times to say it."),
                )
                .handler(|parsed| {
                    let name = parsed.string("name").unwrap_or_default();

                    for _ in 0..parsed.int("times").unwrap_or(1) {
                        println!("Hello, {name}!");
                    }

                    if parsed.bool("verbose") == Some(true) {
                        let source = parsed.called_as("name").unwrap_or("the default");
                        println!("(name taken from {source})");
                    }

                    Ok(())
                })
        })
        .command("farewell", |farewell| {
            farewell
                .about("Say goodbye.")
                .add(
                    Opt::string("tone", "polite")
                        .valid_values(["polite", "curt"])
                        .description("How to say it."),
                )
                .handler(|parsed| {
                    match parsed.string("tone") {
                        Some("curt") => println!("Bye."),
                        _ => println!("Farewell, and thank you."),
                    }

                    Ok(())
                })
        })
        .help_command()
        .build();

    program.dispatch();
}
