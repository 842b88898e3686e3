use crate::TestClass;
use std::path::PathBuf;

pub struct Settings {
    /// `java` launcher used for the child JVMs
    pub java: PathBuf,

    /// `javac` used to compile the generated test classes
    pub javac: PathBuf,

    /// Directory holding generated sources and compiled classes (also the child class path)
    pub output_directory: PathBuf,

    /// Java package of the test classes, written as `compiler.c2.aarch64`
    pub package: String,

    /// Extra VM options passed to every child JVM, ahead of the test flags
    pub extra_vm_options: Vec<String>,
}

impl Settings {
    pub const DEFAULT_PACKAGE: &'static str = "compiler.c2.aarch64";

    /// Qualified module export that the `Unsafe` based classes need (both to compile and run)
    pub const UNSAFE_EXPORT: &'static str = "java.base/jdk.internal.misc=ALL-UNNAMED";

    pub fn new() -> Settings {
        Settings {
            java: PathBuf::from("java"),
            javac: PathBuf::from("javac"),
            output_directory: PathBuf::from("out"),
            package: String::from(Self::DEFAULT_PACKAGE),
            extra_vm_options: vec![],
        }
    }

    /// Fully qualified name of a test class (eg. `compiler.c2.aarch64.TestVolatileLoad`)
    pub fn qualified_class_name(&self, class: TestClass) -> String {
        if self.package.is_empty() {
            class.class_name().to_owned()
        } else {
            format!("{}.{}", self.package, class.class_name())
        }
    }

    /// Directory into which a test class's `.java` source goes
    pub fn source_directory(&self) -> PathBuf {
        self.package
            .split('.')
            .filter(|part| !part.is_empty())
            .fold(self.output_directory.clone(), |dir, part| dir.join(part))
    }
}

impl Default for Settings {
    fn default() -> Settings {
        Settings::new()
    }
}
