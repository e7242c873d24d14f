use super::{OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{Script, Stmt},
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![OperationDef::new(
        "execute_script",
        "Script Result",
        "Run arbitrary ExtendScript in InDesign. The value of the last expression is returned",
        execute_script,
    )
    .param(ParamSpec::text("code", "ExtendScript source").required())]
}

/// The caller's code runs as written: no document guard and no escaping.
fn execute_script(params: &Params) -> Result<Script, ParamError> {
    let code = params.require_text("code")?;
    Ok(Script::from_statements(vec![Stmt::Raw(code.to_string())]))
}
