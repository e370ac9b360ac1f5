use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("zenn-migrate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate Zenn articles to local Markdown files")
        .arg(clap::arg!([USERNAME] "Zenn username whose articles are migrated").default_value("tktcorporation"))
        .arg(
            clap::arg!(-o --"output-dir" <DIR> "Directory the articles are written to")
                .value_name("DIR")
                .default_value("articles")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--slug <SLUG> "Migrate only this slug instead of listing the account (repeatable)")
                .action(clap::ArgAction::Append),
        )
        .arg(clap::arg!(--delay <SECS> "Pause between articles in seconds").default_value("2"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds (default: no timeout)"))
        .arg(clap::arg!(--"base-url" <URL> "Base URL of the Zenn site").default_value("https://zenn.dev"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests").value_name("UA"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "zenn-migrate", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "zenn-migrate", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "zenn-migrate", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "zenn-migrate", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
