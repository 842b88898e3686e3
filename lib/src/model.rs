//! Test classes, operation kinds, collectors, and configuration axes.

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// Kind of volatile memory operation performed by the methods under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Load,
    Store,
    Cas,
    WeakCas,
    CompareAndExchange,
    GetAndSet,
    GetAndAdd,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        OperationKind::Load,
        OperationKind::Store,
        OperationKind::Cas,
        OperationKind::WeakCas,
        OperationKind::CompareAndExchange,
        OperationKind::GetAndSet,
        OperationKind::GetAndAdd,
    ];

    /// Data kinds exercised by a test class of this operation kind, in the order in which their
    /// compiled methods are expected to appear in the output
    pub fn data_kinds(self) -> &'static [DataKind] {
        use DataKind::*;
        match self {
            OperationKind::Load | OperationKind::Store => &[Int, Object],
            OperationKind::Cas | OperationKind::WeakCas | OperationKind::CompareAndExchange => {
                &[Int, Long, Byte, Short, Object]
            }
            OperationKind::GetAndSet => &[Int, Long, Object],
            OperationKind::GetAndAdd => &[Int, Long],
        }
    }

    /// Whether runs should also toggle compressed oops
    ///
    /// `getAndAdd` has no object variant, so the reference width never shows up in its code.
    pub fn varies_compressed_oops(self) -> bool {
        self != OperationKind::GetAndAdd
    }
}

/// Type of the volatile field operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Int,
    Long,
    Byte,
    Short,
    Object,
}

impl DataKind {
    /// Name of the synthetic method exercising this data kind
    pub fn method_name(self) -> &'static str {
        match self {
            DataKind::Int => "testInt",
            DataKind::Long => "testLong",
            DataKind::Byte => "testByte",
            DataKind::Short => "testShort",
            DataKind::Object => "testObj",
        }
    }
}

/// Operation and field type together select an expected sequence table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestSpec {
    pub operation: OperationKind,
    pub data: DataKind,
}

/// One of the named Java test classes that get spawned in a child JVM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestClass {
    VolatileLoad,
    VolatileStore,
    UnsafeVolatileLoad,
    UnsafeVolatileStore,
    UnsafeVolatileCas,
    UnsafeVolatileWeakCas,
    UnsafeVolatileCae,
    UnsafeVolatileGas,
    UnsafeVolatileGaa,
}

impl TestClass {
    pub const ALL: [TestClass; 9] = [
        TestClass::VolatileLoad,
        TestClass::VolatileStore,
        TestClass::UnsafeVolatileLoad,
        TestClass::UnsafeVolatileStore,
        TestClass::UnsafeVolatileCas,
        TestClass::UnsafeVolatileWeakCas,
        TestClass::UnsafeVolatileCae,
        TestClass::UnsafeVolatileGas,
        TestClass::UnsafeVolatileGaa,
    ];

    /// Simple (unqualified) Java class name
    pub fn class_name(self) -> &'static str {
        match self {
            TestClass::VolatileLoad => "TestVolatileLoad",
            TestClass::VolatileStore => "TestVolatileStore",
            TestClass::UnsafeVolatileLoad => "TestUnsafeVolatileLoad",
            TestClass::UnsafeVolatileStore => "TestUnsafeVolatileStore",
            TestClass::UnsafeVolatileCas => "TestUnsafeVolatileCAS",
            TestClass::UnsafeVolatileWeakCas => "TestUnsafeVolatileWeakCAS",
            TestClass::UnsafeVolatileCae => "TestUnsafeVolatileCAE",
            TestClass::UnsafeVolatileGas => "TestUnsafeVolatileGAS",
            TestClass::UnsafeVolatileGaa => "TestUnsafeVolatileGAA",
        }
    }

    pub fn operation(self) -> OperationKind {
        match self {
            TestClass::VolatileLoad | TestClass::UnsafeVolatileLoad => OperationKind::Load,
            TestClass::VolatileStore | TestClass::UnsafeVolatileStore => OperationKind::Store,
            TestClass::UnsafeVolatileCas => OperationKind::Cas,
            TestClass::UnsafeVolatileWeakCas => OperationKind::WeakCas,
            TestClass::UnsafeVolatileCae => OperationKind::CompareAndExchange,
            TestClass::UnsafeVolatileGas => OperationKind::GetAndSet,
            TestClass::UnsafeVolatileGaa => OperationKind::GetAndAdd,
        }
    }

    /// Does the class go through `jdk.internal.misc.Unsafe` instead of plain field accesses?
    pub fn uses_unsafe(self) -> bool {
        !matches!(self, TestClass::VolatileLoad | TestClass::VolatileStore)
    }
}

impl FromStr for TestClass {
    type Err = Error;

    fn from_str(name: &str) -> Result<TestClass, Error> {
        TestClass::ALL
            .iter()
            .copied()
            .find(|class| class.class_name() == name)
            .ok_or_else(|| Error::UnknownTestClass(name.to_owned()))
    }
}

impl fmt::Display for TestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Garbage collector configuration of the child JVM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcMode {
    G1,
    Cms,
    CmsCondMark,
    Serial,
    Parallel,
    Shenandoah,
    ShenandoahTraversal,
}

impl GcMode {
    pub const ALL: [GcMode; 7] = [
        GcMode::G1,
        GcMode::Cms,
        GcMode::CmsCondMark,
        GcMode::Serial,
        GcMode::Parallel,
        GcMode::Shenandoah,
        GcMode::ShenandoahTraversal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GcMode::G1 => "G1",
            GcMode::Cms => "CMS",
            GcMode::CmsCondMark => "CMSCondMark",
            GcMode::Serial => "Serial",
            GcMode::Parallel => "Parallel",
            GcMode::Shenandoah => "Shenandoah",
            GcMode::ShenandoahTraversal => "ShenandoahTraversal",
        }
    }

    /// VM flags selecting and configuring the collector
    pub fn vm_flags(self) -> &'static [&'static str] {
        match self {
            GcMode::G1 => &["-XX:+UseG1GC"],
            GcMode::Parallel => &["-XX:+UseParallelGC"],
            GcMode::Serial => &["-XX:+UseSerialGC"],
            GcMode::Cms => &["-XX:+UseConcMarkSweepGC", "-XX:-UseCondCardMark"],
            GcMode::CmsCondMark => &["-XX:+UseConcMarkSweepGC", "-XX:+UseCondCardMark"],
            GcMode::Shenandoah => &["-XX:+UnlockExperimentalVMOptions", "-XX:+UseShenandoahGC"],
            GcMode::ShenandoahTraversal => &[
                "-XX:+UnlockExperimentalVMOptions",
                "-XX:+UseShenandoahGC",
                "-XX:ShenandoahGCMode=traversal",
            ],
        }
    }
}

impl FromStr for GcMode {
    type Err = Error;

    fn from_str(name: &str) -> Result<GcMode, Error> {
        GcMode::ALL
            .iter()
            .copied()
            .find(|gc| gc.name() == name)
            .ok_or_else(|| Error::UnknownGcMode(name.to_owned()))
    }
}

impl fmt::Display for GcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The two binary switches varied across runs of the same test class and collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfigAxis {
    /// `-XX:+UseBarriersForVolatile`: emit explicit `dmb` fences instead of `ldar`/`stlr`
    pub use_barriers_for_volatile: bool,

    /// `-XX:+UseCompressedOops`: object references are 32-bit
    pub use_compressed_oops: bool,
}

impl ConfigAxis {
    pub fn new(use_barriers_for_volatile: bool, use_compressed_oops: bool) -> ConfigAxis {
        ConfigAxis {
            use_barriers_for_volatile,
            use_compressed_oops,
        }
    }

    /// Axis values to run for an operation, in order
    ///
    /// Compressed oops come first, each with the transform applied then with explicit barriers.
    pub fn expand(operation: OperationKind) -> Vec<ConfigAxis> {
        let mut axes = vec![ConfigAxis::new(false, true), ConfigAxis::new(true, true)];
        if operation.varies_compressed_oops() {
            axes.push(ConfigAxis::new(false, false));
            axes.push(ConfigAxis::new(true, false));
        }
        axes
    }
}

impl fmt::Display for ConfigAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}UseBarriersForVolatile {}UseCompressedOops",
            if self.use_barriers_for_volatile { '+' } else { '-' },
            if self.use_compressed_oops { '+' } else { '-' },
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_gc_modes() {
        for gc in GcMode::ALL {
            assert_eq!(gc.name().parse::<GcMode>().unwrap(), gc);
        }
        assert!(matches!(
            "Epsilon".parse::<GcMode>(),
            Err(Error::UnknownGcMode(name)) if name == "Epsilon"
        ));
        assert!("g1".parse::<GcMode>().is_err());
    }

    #[test]
    fn parse_test_classes() {
        assert_eq!(
            "TestUnsafeVolatileCAE".parse::<TestClass>().unwrap(),
            TestClass::UnsafeVolatileCae
        );
        assert_eq!(
            "TestVolatileLoad".parse::<TestClass>().unwrap().operation(),
            OperationKind::Load
        );
        assert!(matches!(
            "TestVolatileSwap".parse::<TestClass>(),
            Err(Error::UnknownTestClass(_))
        ));
    }

    #[test]
    fn every_operation_has_a_class() {
        for operation in OperationKind::ALL {
            assert!(TestClass::ALL.iter().any(|c| c.operation() == operation));
        }
    }

    #[test]
    fn get_and_add_holds_compressed_oops() {
        assert_eq!(
            ConfigAxis::expand(OperationKind::GetAndAdd),
            vec![ConfigAxis::new(false, true), ConfigAxis::new(true, true)]
        );
        let store = ConfigAxis::expand(OperationKind::Store);
        assert_eq!(store.len(), 4);
        assert!(store.contains(&ConfigAxis::new(true, false)));
        assert!(store.contains(&ConfigAxis::new(false, false)));
    }

    #[test]
    fn cms_flags() {
        assert_eq!(
            GcMode::Cms.vm_flags(),
            &["-XX:+UseConcMarkSweepGC", "-XX:-UseCondCardMark"]
        );
        assert_eq!(GcMode::ShenandoahTraversal.vm_flags().len(), 3);
    }
}
