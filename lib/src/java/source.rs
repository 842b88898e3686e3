//! Java source of the synthetic test classes run in the child JVMs.
//!
//! Each class has one volatile field per data kind it exercises, and one `test*` method per field
//! performing the class's operation. `main` calls every test method in a hot loop so that C2
//! compiles them, in the same order the verifier expects their blocks.

use super::JavaWriter;
use crate::{DataKind, OperationKind, TestClass};
use std::io::{Result, Write};

/// Iterations of the hot loop (comfortably above the C2 compile threshold)
const ITERATIONS: u32 = 100_000;

/// How a data kind is spelled in Java
struct JavaKind {
    /// Java type (eg. `int`)
    java_type: &'static str,

    /// Suffix of the matching `Unsafe` methods (eg. `Int` in `getIntVolatile`)
    unsafe_suffix: &'static str,

    /// Argument passed from the hot loop, in terms of the loop counter `i`
    argument: &'static str,
}

fn java_kind(data: DataKind) -> JavaKind {
    let (java_type, unsafe_suffix, argument) = match data {
        DataKind::Int => ("int", "Int", "i"),
        DataKind::Long => ("long", "Long", "(long) i"),
        DataKind::Byte => ("byte", "Byte", "(byte) i"),
        DataKind::Short => ("short", "Short", "(short) i"),
        DataKind::Object => ("Object", "Reference", "o"),
    };
    JavaKind {
        java_type,
        unsafe_suffix,
        argument,
    }
}

fn field_name(data: DataKind) -> &'static str {
    match data {
        DataKind::Int => "f_int",
        DataKind::Long => "f_long",
        DataKind::Byte => "f_byte",
        DataKind::Short => "f_short",
        DataKind::Object => "f_obj",
    }
}

fn offset_name(data: DataKind) -> String {
    format!("{}_OFFSET", field_name(data).to_uppercase())
}

/// Write out the complete source of a test class
pub fn write_test_class<W: Write>(
    writer: &mut JavaWriter<W>,
    package: &str,
    class: TestClass,
) -> Result<()> {
    let operation = class.operation();
    let data_kinds = operation.data_kinds();
    let class_name = class.class_name();

    if !package.is_empty() {
        writer.line(format_args!("package {};", package))?;
        writer.blank()?;
    }
    if class.uses_unsafe() {
        writer.line(format_args!("import jdk.internal.misc.Unsafe;"))?;
        writer.blank()?;
    }

    writer.open_block(format_args!("public class {}", class_name))?;

    for &data in data_kinds {
        let kind = java_kind(data);
        let initial = if data == DataKind::Object { "null" } else { "0" };
        writer.line(format_args!(
            "public volatile {} {} = {};",
            kind.java_type,
            field_name(data),
            initial
        ))?;
    }

    if class.uses_unsafe() {
        writer.blank()?;
        writer.line(format_args!(
            "private static final Unsafe UNSAFE = Unsafe.getUnsafe();"
        ))?;
        for &data in data_kinds {
            writer.line(format_args!(
                "private static final long {};",
                offset_name(data)
            ))?;
        }
        writer.blank()?;
        writer.open_block(format_args!("static"))?;
        writer.open_block(format_args!("try"))?;
        for &data in data_kinds {
            writer.line(format_args!(
                "{} = UNSAFE.objectFieldOffset({}.class.getDeclaredField(\"{}\"));",
                offset_name(data),
                class_name,
                field_name(data)
            ))?;
        }
        writer.continue_block(format_args!("catch (ReflectiveOperationException e)"))?;
        writer.line(format_args!("throw new ExceptionInInitializerError(e);"))?;
        writer.close_block()?;
        writer.close_block()?;
    }

    writer.blank()?;
    write_main(writer, class)?;

    for &data in data_kinds {
        writer.blank()?;
        write_test_method(writer, class, data)?;
    }

    writer.close_block()?;
    Ok(())
}

fn write_main<W: Write>(writer: &mut JavaWriter<W>, class: TestClass) -> Result<()> {
    let operation = class.operation();
    let data_kinds = operation.data_kinds();

    writer.open_block(format_args!("public static void main(String[] args)"))?;
    writer.line(format_args!(
        "{name} t = new {name}();",
        name = class.class_name()
    ))?;
    if data_kinds.contains(&DataKind::Object) {
        writer.line(format_args!("Object o = new Object();"))?;
    }
    writer.line(format_args!("long sink = 0;"))?;
    writer.open_block(format_args!(
        "for (int i = 0; i < {}; i++)",
        ITERATIONS
    ))?;
    for &data in data_kinds {
        let argument = java_kind(data).argument;
        let arguments = match operation {
            OperationKind::Load => String::new(),
            OperationKind::Store | OperationKind::GetAndSet | OperationKind::GetAndAdd => {
                argument.to_owned()
            }
            OperationKind::Cas | OperationKind::WeakCas | OperationKind::CompareAndExchange => {
                format!("{}, {}", argument, argument)
            }
        };
        let call = format!("t.{}({})", data.method_name(), arguments);

        // Results feed a local so that the calls stay live
        match operation {
            OperationKind::Store => writer.line(format_args!("{};", call))?,
            OperationKind::Cas | OperationKind::WeakCas => {
                writer.line(format_args!("sink += {} ? 1 : 0;", call))?
            }
            _ if data == DataKind::Object => {
                writer.line(format_args!("if ({} != null) sink++;", call))?
            }
            _ => writer.line(format_args!("sink += {};", call))?,
        }
    }
    writer.close_block()?;
    writer.line(format_args!(
        "System.out.println(\"{} done \" + sink);",
        class.class_name()
    ))?;
    writer.close_block()
}

fn write_test_method<W: Write>(
    writer: &mut JavaWriter<W>,
    class: TestClass,
    data: DataKind,
) -> Result<()> {
    let kind = java_kind(data);
    let ty = kind.java_type;
    let field = field_name(data);
    let offset = offset_name(data);
    let suffix = kind.unsafe_suffix;
    let method = data.method_name();

    match (class.operation(), class.uses_unsafe()) {
        (OperationKind::Load, false) => {
            writer.open_block(format_args!("public {} {}()", ty, method))?;
            writer.line(format_args!("return {};", field))?;
        }
        (OperationKind::Load, true) => {
            writer.open_block(format_args!("public {} {}()", ty, method))?;
            writer.line(format_args!(
                "return UNSAFE.get{}Volatile(this, {});",
                suffix, offset
            ))?;
        }
        (OperationKind::Store, false) => {
            writer.open_block(format_args!("public void {}({} value)", method, ty))?;
            writer.line(format_args!("{} = value;", field))?;
        }
        (OperationKind::Store, true) => {
            writer.open_block(format_args!("public void {}({} value)", method, ty))?;
            writer.line(format_args!(
                "UNSAFE.put{}Volatile(this, {}, value);",
                suffix, offset
            ))?;
        }
        (OperationKind::Cas, _) | (OperationKind::WeakCas, _) => {
            let unsafe_method = if class.operation() == OperationKind::WeakCas {
                "weakCompareAndSet"
            } else {
                "compareAndSet"
            };
            writer.open_block(format_args!(
                "public boolean {}({ty} expected, {ty} value)",
                method,
                ty = ty
            ))?;
            writer.line(format_args!(
                "return UNSAFE.{}{}(this, {}, expected, value);",
                unsafe_method, suffix, offset
            ))?;
        }
        (OperationKind::CompareAndExchange, _) => {
            writer.open_block(format_args!(
                "public {ty} {}({ty} expected, {ty} value)",
                method,
                ty = ty
            ))?;
            writer.line(format_args!(
                "return UNSAFE.compareAndExchange{}(this, {}, expected, value);",
                suffix, offset
            ))?;
        }
        (OperationKind::GetAndSet, _) => {
            writer.open_block(format_args!("public {} {}({} value)", ty, method, ty))?;
            writer.line(format_args!(
                "return UNSAFE.getAndSet{}(this, {}, value);",
                suffix, offset
            ))?;
        }
        (OperationKind::GetAndAdd, _) => {
            writer.open_block(format_args!("public {} {}({} delta)", ty, method, ty))?;
            writer.line(format_args!(
                "return UNSAFE.getAndAdd{}(this, {}, delta);",
                suffix, offset
            ))?;
        }
    }
    writer.close_block()
}

/// Complete source of a test class, as a string
pub fn test_class_source(package: &str, class: TestClass) -> Result<String> {
    let mut writer = JavaWriter::new(vec![]);
    write_test_class(&mut writer, package, class)?;
    let bytes = writer.finish()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
