//! Generating and compiling the Java test classes that the child JVMs run.

mod source;
mod writer;

pub use source::{test_class_source, write_test_class};
pub use writer::JavaWriter;

use crate::{runner, Error, Settings, TestClass};
use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::Command;

/// Write one `.java` file per test class into the settings' source directory
///
/// Returns the paths of the written files, in the same order as the classes.
pub fn generate_sources(settings: &Settings, classes: &[TestClass]) -> Result<Vec<PathBuf>, Error> {
    let source_directory = settings.source_directory();
    fs::create_dir_all(&source_directory)?;

    let mut sources = Vec::with_capacity(classes.len());
    for &class in classes {
        let path = source_directory.join(format!("{}.java", class.class_name()));
        log::debug!("Writing test class {:?}", &path);

        let file = BufWriter::new(fs::File::create(&path)?);
        let mut writer = JavaWriter::new(file);
        write_test_class(&mut writer, &settings.package, class)?;
        writer.finish()?;

        sources.push(path);
    }
    Ok(sources)
}

/// `javac` command compiling the given sources into the output directory
pub fn compile_command(settings: &Settings, sources: &[PathBuf]) -> Command {
    let mut command = Command::new(&settings.javac);
    command
        .arg("-d")
        .arg(&settings.output_directory)
        .arg("--add-exports")
        .arg(Settings::UNSAFE_EXPORT)
        .args(sources);
    command
}

/// Compile the given sources with `javac`
pub fn compile(settings: &Settings, sources: &[PathBuf]) -> Result<(), Error> {
    if sources.is_empty() {
        return Ok(());
    }

    log::info!("Compiling {} test class(es)", sources.len());
    let output = runner::capture(&mut compile_command(settings, sources))?;
    if output.exit_code != Some(0) {
        return Err(Error::JavacFailed(output));
    }
    Ok(())
}

/// Generate then compile the given test classes
pub fn prepare_classes(settings: &Settings, classes: &[TestClass]) -> Result<(), Error> {
    let sources = generate_sources(settings, classes)?;
    compile(settings, &sources)
}
