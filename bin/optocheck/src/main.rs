mod error;

use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use error::TestOutcome;
use optocheck::{java, CapturedOutput, ConfigAxis, GcMode, Settings, TestClass};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;
use std::{fs, str::FromStr};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn cli() -> Command {
    Command::new("optocheck")
        .version(crate_version!())
        .author("Alec Theriault <alec.theriault@gmail.com>")
        .about("Check C2 volatile barrier sequences in PrintOptoAssembly output")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("run")
                .about("Generate, compile and run the test classes, checking their assembly")
                .arg(
                    Arg::new("java")
                        .long("java")
                        .value_name("JAVA")
                        .value_parser(value_parser!(PathBuf))
                        .help("Sets the `java` executable to use"),
                )
                .arg(
                    Arg::new("javac")
                        .long("javac")
                        .value_name("JAVA_COMPILER")
                        .value_parser(value_parser!(PathBuf))
                        .help("Sets the `javac` executable to use"),
                )
                .arg(
                    Arg::new("output")
                        .long("output-directory")
                        .value_name("DIRECTORY")
                        .value_parser(value_parser!(PathBuf))
                        .default_value("out")
                        .help("Sets the output directory (also the class path of the test JVMs)"),
                )
                .arg(
                    Arg::new("package")
                        .long("package")
                        .value_name("PACKAGE")
                        .default_value(Settings::DEFAULT_PACKAGE)
                        .help("Sets the Java package of the test classes"),
                )
                .arg(
                    Arg::new("vm option")
                        .long("vm-option")
                        .value_name("OPTION")
                        .action(ArgAction::Append)
                        .allow_hyphen_values(true)
                        .help("Extra option passed to every test JVM (repeatable)"),
                )
                .arg(
                    Arg::new("gc")
                        .long("gc")
                        .value_name("MODE")
                        .action(ArgAction::Append)
                        .help("Garbage collector mode to test under (repeatable, default all)"),
                )
                .arg(
                    Arg::new("skip compile")
                        .long("skip-compile")
                        .action(ArgAction::SetTrue)
                        .help("Reuse already compiled test classes"),
                )
                .arg(
                    Arg::new("CLASS")
                        .num_args(0..)
                        .help("Test classes to run (default all)"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check a saved PrintOptoAssembly dump for one configuration")
                .arg(
                    Arg::new("class")
                        .long("class")
                        .value_name("CLASS")
                        .required(true)
                        .help("Test class that produced the dump (eg. `TestVolatileStore`)"),
                )
                .arg(
                    Arg::new("gc")
                        .long("gc")
                        .value_name("MODE")
                        .required(true)
                        .help("Garbage collector mode the dump was produced under"),
                )
                .arg(
                    Arg::new("barriers")
                        .long("barriers")
                        .action(ArgAction::SetTrue)
                        .help("The dump was produced with -XX:+UseBarriersForVolatile"),
                )
                .arg(
                    Arg::new("no compressed oops")
                        .long("no-compressed-oops")
                        .action(ArgAction::SetTrue)
                        .help("The dump was produced with -XX:-UseCompressedOops"),
                )
                .arg(
                    Arg::new("DUMP")
                        .value_parser(value_parser!(PathBuf))
                        .required(true)
                        .help("File holding the captured JVM output"),
                ),
        )
}

fn main() -> io::Result<()> {
    env_logger::init();

    let matches = cli().get_matches();
    let code = match matches.subcommand() {
        Some(("run", matches)) => run(matches)?,
        Some(("check", matches)) => check(matches)?,
        _ => unreachable!("subcommand is required"),
    };
    exit(code)
}

/// Parse every value of a repeated argument, defaulting to all values when there are none
fn parse_all<T>(matches: &ArgMatches, id: &str, all: &[T]) -> Result<Vec<T>, T::Err>
where
    T: FromStr + Copy,
{
    match matches.get_many::<String>(id) {
        None => Ok(all.to_vec()),
        Some(values) => values.map(|value| value.parse::<T>()).collect(),
    }
}

fn run(matches: &ArgMatches) -> io::Result<i32> {
    let mut settings = Settings::new();
    if let Some(java) = matches.get_one::<PathBuf>("java") {
        settings.java = java.clone();
    }
    if let Some(javac) = matches.get_one::<PathBuf>("javac") {
        settings.javac = javac.clone();
    }
    if let Some(output) = matches.get_one::<PathBuf>("output") {
        settings.output_directory = output.clone();
    }
    if let Some(package) = matches.get_one::<String>("package") {
        settings.package = package.clone();
    }
    if let Some(options) = matches.get_many::<String>("vm option") {
        settings.extra_vm_options = options.cloned().collect();
    }

    let classes = match parse_all(matches, "CLASS", &TestClass::ALL) {
        Ok(classes) => classes,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            return Ok(1);
        }
    };
    let gc_modes = match parse_all(matches, "gc", &GcMode::ALL) {
        Ok(gc_modes) => gc_modes,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            return Ok(1);
        }
    };

    let stdout = StandardStream::stdout(ColorChoice::Auto);

    fs::create_dir_all(&settings.output_directory)?;
    if !matches.get_flag("skip compile") {
        let outcome = TestOutcome::from(java::prepare_classes(&settings, &classes));
        if !matches!(outcome, TestOutcome::Ok) {
            report(&stdout, "javac", outcome)?;
            return Ok(1);
        }
    }

    let mut count_ok = 0;
    let mut count_fail = 0;
    let mut count_error = 0;
    for &class in &classes {
        for &gc in &gc_modes {
            let outcome = TestOutcome::from(optocheck::run_test(&settings, class, gc));
            match outcome {
                TestOutcome::Ok => count_ok += 1,
                TestOutcome::Fail(_) => count_fail += 1,
                TestOutcome::Error(_) => count_error += 1,
            }
            report(&stdout, &format!("{} ({})", class, gc), outcome)?;
        }
    }

    log::info!(
        "{} passed, {} failed, {} errored",
        count_ok,
        count_fail,
        count_error
    );
    Ok(if count_fail > 0 || count_error > 0 {
        1
    } else {
        0
    })
}

fn check(matches: &ArgMatches) -> io::Result<i32> {
    let stdout = StandardStream::stdout(ColorChoice::Auto);
    let outcome = TestOutcome::from(check_dump(matches));
    let code = outcome.check_exit_code();
    if let TestOutcome::Fail(message) | TestOutcome::Error(message) = &outcome {
        eprintln!("{}", message);
    }
    let name = matches
        .get_one::<PathBuf>("DUMP")
        .map_or_else(String::new, |dump| dump.display().to_string());
    report(&stdout, &name, outcome)?;
    Ok(code)
}

fn check_dump(matches: &ArgMatches) -> Result<(), optocheck::Error> {
    let class: TestClass = matches
        .get_one::<String>("class")
        .map_or("", String::as_str)
        .parse()?;
    let gc: GcMode = matches
        .get_one::<String>("gc")
        .map_or("", String::as_str)
        .parse()?;
    let axis = ConfigAxis::new(
        matches.get_flag("barriers"),
        !matches.get_flag("no compressed oops"),
    );

    let dump = match matches.get_one::<PathBuf>("DUMP") {
        Some(dump) => fs::read_to_string(dump)?,
        None => String::new(),
    };
    let output = CapturedOutput::new(dump, "", Some(0));
    optocheck::check_output(&output, class.operation(), gc, axis)
}

/// Print out a coloured result line, logging the failure message if there is one
fn report(stdout: &StandardStream, name: &str, outcome: TestOutcome) -> io::Result<()> {
    let (color, summary, message) = match outcome {
        TestOutcome::Ok => (Color::Green, b"OK".as_ref(), None),
        TestOutcome::Fail(msg) => (Color::Red, b"FAILED".as_ref(), Some(msg)),
        TestOutcome::Error(msg) => (Color::Yellow, b"ERROR".as_ref(), Some(msg)),
    };

    if let Some(message) = message {
        log::error!("{}", message);
    }

    let mut s = stdout.lock();
    s.write_all(b" - ")?;
    s.set_color(ColorSpec::new().set_bold(true))?;
    s.write_all(name.as_bytes())?;
    s.set_color(ColorSpec::new().set_dimmed(true))?;
    s.write_all(b" [")?;
    s.set_color(ColorSpec::new().set_fg(Some(color)))?;
    s.write_all(summary)?;
    s.set_color(ColorSpec::new().set_dimmed(true))?;
    s.write_all(b"]\n")?;
    s.reset()
}
