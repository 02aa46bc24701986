//! Text emitters for C, cffi and Fortran declarations.

use super::BindingConfig;
use crate::data::{TransitUnion, CANARY_MAGIC};
use crate::error::TransitError;
use crate::schema::{Primitive, SchemaVersion};

const INDENT: &str = "    ";

fn c_member(prim: Primitive, name: &str) -> String {
    let ty = prim.c_type();
    if ty.ends_with('*') {
        format!("{INDENT}{ty}{name};")
    } else {
        format!("{INDENT}{ty} {name};")
    }
}

/// C header declaring the record, the union and the entry prototype.
///
/// The record and union are anonymous typedefs, the way cffi expects them.
pub fn c_header(config: &BindingConfig) -> Result<String, TransitError> {
    config.validate()?;

    let schema = config.schema;
    let fields = schema.fields();
    let mut lines = vec![
        "#pragma once".to_string(),
        String::new(),
        format!(
            "/* transit schema {schema} ({}), {} bytes */",
            schema.name(),
            schema.size()
        ),
    ];

    if fields.iter().any(|f| f.primitive == Primitive::CBool) {
        lines.push(String::new());
        lines.push("#include <stdbool.h>".to_string());
    }
    if schema == SchemaVersion::V2 {
        lines.push(String::new());
        lines.push(format!("#define TRANSIT_CANARY_MAGIC {CANARY_MAGIC}"));
    }

    lines.push(String::new());
    lines.push("typedef struct".to_string());
    lines.push("{".to_string());
    lines.extend(fields.iter().map(|f| c_member(f.primitive, f.name)));
    lines.push(format!("}} {};", config.record_name));

    lines.push(String::new());
    lines.push("typedef union".to_string());
    lines.push("{".to_string());
    lines.extend(TransitUnion::MEMBERS.iter().map(|(name, prim)| c_member(*prim, name)));
    lines.push(format!("}} {};", config.union_name));

    lines.push(String::new());
    let export = config
        .export_macro
        .as_ref()
        .map(|m| format!("{m} "))
        .unwrap_or_default();
    lines.push(format!(
        "extern {export}void {}({} *, {} *);",
        config.entry_symbol, config.record_name, config.union_name
    ));
    lines.push(String::new());

    Ok(lines.join("\n"))
}

/// Turn a header from [`c_header`] into text for cffi's `cdef`/`embedding_api`.
///
/// Preprocessor lines are dropped and the export annotation removed, since
/// cffi adds its own.
pub fn cffi_cdef(header: &str, config: &BindingConfig) -> String {
    let mut out = String::new();
    for line in header.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        let line = match &config.export_macro {
            Some(m) => line.replace(&format!("{m} "), ""),
            None => line.to_string(),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Fortran module with a `bind(c)` derived type and the entry interface.
///
/// Fortran has no unions; the union is passed by reference as an
/// `integer(kind=c_intptr_t)`, which has exactly the union's size.
pub fn fortran_interface(config: &BindingConfig) -> Result<String, TransitError> {
    config.validate()?;
    for name in [&config.record_name, &config.entry_symbol] {
        if name.starts_with('_') {
            return Err(TransitError::InvalidConfig(format!(
                "`{name}` cannot start with an underscore in Fortran"
            )));
        }
    }

    let record = &config.record_name;
    let entry = &config.entry_symbol;
    let body = INDENT.repeat(2);
    let inner = INDENT.repeat(3);

    let mut lines = vec![
        format!("module {record}_mod"),
        String::new(),
        format!("{INDENT}use iso_c_binding"),
        format!("{INDENT}implicit none"),
        String::new(),
        format!("{INDENT}! transit schema {}", config.schema),
        format!("{INDENT}type, bind(c) :: {record}"),
    ];
    lines.extend(
        config
            .schema
            .fields()
            .iter()
            .map(|f| format!("{body}{} :: {}", f.primitive.fortran_type(), f.name)),
    );
    lines.push(format!("{INDENT}end type {record}"));
    lines.push(String::new());
    lines.push(format!("{INDENT}interface"));
    lines.push(format!(
        "{body}subroutine {entry}(data, value) bind(c, name=\"{entry}\")"
    ));
    lines.push(format!("{inner}import :: {record}, c_intptr_t"));
    lines.push(format!("{inner}type({record}), intent(inout) :: data"));
    lines.push(format!("{inner}integer(kind=c_intptr_t), intent(inout) :: value"));
    lines.push(format!("{body}end subroutine {entry}"));
    lines.push(format!("{INDENT}end interface"));
    lines.push(String::new());
    lines.push(format!("end module {record}_mod"));
    lines.push(String::new());

    Ok(lines.join("\n"))
}
