//! Static catalog of InDesign operations: names, parameter contracts and payload templates.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    error::ParamError,
    script::{self, int, let_, result, str, var, BinOp, Expr, Script, ScriptPayload, Stmt},
};

mod color;
mod document;
mod export;
mod graphics;
mod layer;
mod page;
pub mod params;
mod passthrough;
mod style;
mod table;
mod text;

pub use page::ONLY_PAGE_REFUSAL;
pub use params::{ParamKind, ParamSpec, ParamValue, Params};

/// Builds the script for one validated call.
pub type Template = fn(&Params) -> Result<Script, ParamError>;

#[derive(Debug, Clone)]
pub struct OperationDef {
    pub name: &'static str,
    /// Human label prefixed to successful results.
    pub label: &'static str,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
    /// Export and packaging jobs run under the long timeout.
    pub long_running: bool,
    template: Template,
}

impl OperationDef {
    pub fn new(
        name: &'static str,
        label: &'static str,
        description: &'static str,
        template: Template,
    ) -> Self {
        Self {
            name,
            label,
            description,
            params: Vec::new(),
            long_running: false,
            template,
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn long_running(mut self) -> Self {
        self.long_running = true;
        self
    }

    pub fn validate(&self, args: &Value) -> Result<Params, ParamError> {
        params::validate(&self.params, args)
    }

    /// Render the payload for already validated parameters. Pure.
    pub fn render(&self, params: &Params) -> Result<ScriptPayload, ParamError> {
        Ok((self.template)(params)?.render())
    }

    pub fn input_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.to_string(),
            description: self.description.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool entry as advertised on `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    ops: Vec<OperationDef>,
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    pub fn new(ops: Vec<OperationDef>) -> Self {
        let index = ops.iter().enumerate().map(|(i, op)| (op.name, i)).collect();
        Self { ops, index }
    }

    /// Every built-in InDesign operation.
    pub fn builtin() -> Self {
        let mut ops = Vec::new();
        ops.extend(document::operations());
        ops.extend(page::operations());
        ops.extend(text::operations());
        ops.extend(graphics::operations());
        ops.extend(style::operations());
        ops.extend(color::operations());
        ops.extend(table::operations());
        ops.extend(layer::operations());
        ops.extend(export::operations());
        ops.extend(passthrough::operations());
        Self::new(ops)
    }

    pub fn get(&self, name: &str) -> Option<&OperationDef> {
        self.index.get(name).map(|&i| &self.ops[i])
    }

    pub fn operations(&self) -> &[OperationDef] {
        &self.ops
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.ops.iter().map(OperationDef::descriptor).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

// Shared template pieces.

/// `doc`
fn doc() -> Expr {
    var("doc")
}

/// Message for a 1-based page index past the end of the document.
fn missing_page(page: i64) -> String {
    format!("Page {} does not exist", page)
}

/// Bind `pg` to the 1-based `page` of `doc` and run `body`, or report the missing page.
fn on_page(page: i64, body: Vec<Stmt>) -> Stmt {
    let mut found = vec![let_("pg", doc().dot("pages").at(int(page - 1)))];
    found.extend(body);
    script::if_else(
        doc().dot("pages").len().bin(BinOp::Lt, int(page)),
        vec![result(str(missing_page(page)))],
        found,
    )
}

/// Bind `frame` to the text frame with `id`, or report it missing.
fn with_text_frame(id: i64, body: Vec<Stmt>) -> Vec<Stmt> {
    vec![
        let_("frame", doc().dot("textFrames").call("itemByID", vec![int(id)])),
        script::if_else(
            var("frame").is_valid().negate(),
            vec![result(str(format!("Text frame {} not found", id)))],
            body,
        ),
    ]
}

/// `[y, x, y + height, x + width]` as measurement strings, computed here.
fn bounds(params: &Params, x: &str, y: &str) -> Result<Expr, ParamError> {
    let left = params.require_number(x)?;
    let top = params.require_number(y)?;
    let width = params.require_number("width")?;
    let height = params.require_number("height")?;
    let unit = script::Unit::Pt;
    Ok(Expr::Array(vec![
        Expr::Measure(top, unit),
        Expr::Measure(left, unit),
        Expr::Measure(top + height, unit),
        Expr::Measure(left + width, unit),
    ]))
}

/// `names` joined with ", " or `empty` when nothing was collected.
fn joined_or(names: &'static str, heading: &str, empty: &str) -> Stmt {
    script::if_else(
        var(names).len().equals(int(0)),
        vec![result(str(empty))],
        vec![result(script::concat([
            str(heading),
            var(names).call("join", vec![str(", ")]),
        ]))],
    )
}

/// Collect `collection[i].name` for every item into `names`.
fn collect_names(names: &'static str, collection: Expr) -> Vec<Stmt> {
    vec![
        let_("items", collection),
        let_(names, Expr::Array(vec![])),
        script::for_each(
            "i",
            var("items").len(),
            vec![script::exec(
                var(names).call("push", vec![var("items").at(var("i")).dot("name")]),
            )],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let catalog = Catalog::builtin();
        let mut names: Vec<_> = catalog.operations().iter().map(|op| op.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog.len());
        assert!(catalog.len() >= 35);
    }

    #[test]
    fn every_tool_schema_is_an_object() {
        for tool in Catalog::builtin().descriptors() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(!tool.description.is_empty(), "{}", tool.name);
        }
    }

    #[test]
    fn on_page_converts_to_zero_based() {
        let stmt = on_page(3, vec![result(str("ok"))]);
        let out = Script::from_statements(vec![stmt]).render().into_string();
        assert!(out.starts_with("if (doc.pages.length < 3) {\n    \"Page 3 does not exist\";\n} else {\n    var pg = doc.pages[2];\n"));
    }
}
