use crate::{ConfigAxis, GcMode, Settings, TestClass};
use std::path::PathBuf;
use std::process::Command;

/// Fully determined command line for one child JVM run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvocation {
    pub class: TestClass,
    pub gc: GcMode,
    pub axis: ConfigAxis,

    /// `java` launcher
    program: PathBuf,

    /// Arguments ahead of the test flags (class path, user supplied VM options)
    launcher_args: Vec<String>,

    /// Test flags, collector flags, then the main class
    vm_args: Vec<String>,
}

impl ProcessInvocation {
    pub fn new(
        settings: &Settings,
        class: TestClass,
        gc: GcMode,
        axis: ConfigAxis,
    ) -> ProcessInvocation {
        let qualified_name = settings.qualified_class_name(class);

        let mut vm_args = vec![
            String::from(if axis.use_barriers_for_volatile {
                "-XX:+UseBarriersForVolatile"
            } else {
                "-XX:-UseBarriersForVolatile"
            }),
            String::from(if axis.use_compressed_oops {
                "-XX:+UseCompressedOops"
            } else {
                "-XX:-UseCompressedOops"
            }),
            String::from("-XX:-TieredCompilation"),
            String::from("-XX:+PrintOptoAssembly"),
            format!("-XX:CompileCommand=compileonly,{}::test*", qualified_name),
            String::from("--add-exports"),
            String::from(Settings::UNSAFE_EXPORT),
        ];
        vm_args.extend(gc.vm_flags().iter().map(|flag| String::from(*flag)));
        vm_args.push(qualified_name);

        let mut launcher_args = vec![
            String::from("-cp"),
            settings.output_directory.to_string_lossy().into_owned(),
        ];
        launcher_args.extend(settings.extra_vm_options.iter().cloned());

        ProcessInvocation {
            class,
            gc,
            axis,
            program: settings.java.clone(),
            launcher_args,
            vm_args,
        }
    }

    /// All invocations needed to check a test class under one collector, in run order
    pub fn expand(settings: &Settings, class: TestClass, gc: GcMode) -> Vec<ProcessInvocation> {
        ConfigAxis::expand(class.operation())
            .into_iter()
            .map(|axis| ProcessInvocation::new(settings, class, gc, axis))
            .collect()
    }

    /// Flags that select the behaviour under test (excludes launcher and class path)
    pub fn vm_args(&self) -> &[String] {
        &self.vm_args
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.launcher_args).args(&self.vm_args);
        command
    }

    /// Shell-like rendering, for diagnostics
    pub fn command_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in self.launcher_args.iter().chain(&self.vm_args) {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
