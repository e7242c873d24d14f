use super::{collect_names, doc, joined_or, with_text_frame, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{concat, constant, exec, if_else, let_, result, set, str, var, Expr, Script, Stmt},
};

const ALIGNMENTS: &[&str] = &["left", "center", "right", "justify"];

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "create_paragraph_style",
            "Create Paragraph Style",
            "Create a paragraph style in the active document",
            create_paragraph_style,
        )
        .param(ParamSpec::text("name", "Style name").required())
        .param(ParamSpec::text("font", "Font family and style"))
        .param(ParamSpec::length("font_size", "Point size").min(0.1))
        .param(ParamSpec::length("leading", "Leading").min(0.0))
        .param(ParamSpec::choice("alignment", "Paragraph alignment", ALIGNMENTS))
        .param(ParamSpec::text("color", "Fill swatch name for the text"))
        .param(ParamSpec::text("based_on", "Parent paragraph style")),
        OperationDef::new(
            "create_character_style",
            "Create Character Style",
            "Create a character style in the active document",
            create_character_style,
        )
        .param(ParamSpec::text("name", "Style name").required())
        .param(ParamSpec::text("font", "Font family"))
        .param(ParamSpec::text("font_style", "Font style, e.g. \"Bold\""))
        .param(ParamSpec::length("font_size", "Point size").min(0.1))
        .param(ParamSpec::text("color", "Fill swatch name for the text")),
        OperationDef::new(
            "apply_paragraph_style",
            "Apply Paragraph Style",
            "Apply a paragraph style to all text in a text frame's story",
            apply_paragraph_style,
        )
        .param(ParamSpec::integer("frame_id", "Text frame id").required())
        .param(ParamSpec::text("style", "Paragraph style name").required()),
        OperationDef::new(
            "list_styles",
            "Styles",
            "List paragraph and character style names",
            list_styles,
        )
        .param(
            ParamSpec::choice("kind", "Which styles to list", &["paragraph", "character", "all"])
                .default_choice("all"),
        ),
    ]
}

/// Create `collection.add({name})` as `style` unless a style named `name` exists.
fn create_style(
    collection: &'static str,
    kind: &str,
    name: &str,
    properties: Vec<Stmt>,
) -> Script {
    let styles = || doc().dot(collection);
    let mut created = vec![let_(
        "style",
        styles().call("add", vec![Expr::Object(vec![("name", str(name))])]),
    )];
    created.extend(properties);
    created.push(result(str(format!("Created {} style '{}'", kind, name))));

    Script::with_document(vec![if_else(
        styles().by_name(str(name)).is_valid(),
        vec![result(str(format!("{} style '{}' already exists", capitalize(kind), name)))],
        created,
    )])
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn style_color(params: &Params) -> Option<Stmt> {
    params
        .expr("color")
        .map(|color| set(var("style").dot("fillColor"), doc().dot("swatches").by_name(color)))
}

fn create_paragraph_style(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    let mut props = Vec::new();
    if let Some(font) = params.expr("font") {
        props.push(set(var("style").dot("appliedFont"), font));
    }
    if let Some(size) = params.expr("font_size") {
        props.push(set(var("style").dot("pointSize"), size));
    }
    if let Some(leading) = params.expr("leading") {
        props.push(set(var("style").dot("leading"), leading));
    }
    if let Some(alignment) = params.text("alignment") {
        let justification = match alignment {
            "center" => "CENTER_ALIGN",
            "right" => "RIGHT_ALIGN",
            "justify" => "LEFT_JUSTIFIED",
            _ => "LEFT_ALIGN",
        };
        props.push(set(
            var("style").dot("justification"),
            constant("Justification", justification),
        ));
    }
    props.extend(style_color(params));
    if let Some(parent) = params.expr("based_on") {
        props.push(set(
            var("style").dot("basedOn"),
            doc().dot("paragraphStyles").by_name(parent),
        ));
    }
    Ok(create_style("paragraphStyles", "paragraph", name, props))
}

fn create_character_style(params: &Params) -> Result<Script, ParamError> {
    let name = params.require_text("name")?;
    let mut props = Vec::new();
    if let Some(font) = params.expr("font") {
        props.push(set(var("style").dot("appliedFont"), font));
    }
    if let Some(font_style) = params.expr("font_style") {
        props.push(set(var("style").dot("fontStyle"), font_style));
    }
    if let Some(size) = params.expr("font_size") {
        props.push(set(var("style").dot("pointSize"), size));
    }
    props.extend(style_color(params));
    Ok(create_style("characterStyles", "character", name, props))
}

fn apply_paragraph_style(params: &Params) -> Result<Script, ParamError> {
    let id = params.require_integer("frame_id")?;
    let style = params.require_text("style")?;
    let body = vec![
        let_("style", doc().dot("paragraphStyles").by_name(str(style))),
        if_else(
            var("style").is_valid().negate(),
            vec![result(str(format!("Paragraph style '{}' not found", style)))],
            vec![
                exec(
                    var("frame")
                        .dot("parentStory")
                        .dot("texts")
                        .at(crate::script::int(0))
                        .call("applyParagraphStyle", vec![var("style"), Expr::Bool(true)]),
                ),
                result(str(format!(
                    "Applied paragraph style '{}' to text frame {}",
                    style, id
                ))),
            ],
        ),
    ];
    Ok(Script::with_document(with_text_frame(id, body)))
}

fn list_styles(params: &Params) -> Result<Script, ParamError> {
    let mut body = Vec::new();
    let kind = params.require_text("kind")?;
    if kind != "character" {
        body.extend(collect_names("paragraph", doc().dot("paragraphStyles")));
    }
    if kind != "paragraph" {
        body.extend(collect_names("character", doc().dot("characterStyles")));
    }
    match kind {
        "paragraph" => body.push(joined_or("paragraph", "Paragraph styles: ", "No paragraph styles")),
        "character" => body.push(joined_or("character", "Character styles: ", "No character styles")),
        _ => body.push(result(concat([
            str("Paragraph styles: "),
            var("paragraph").call("join", vec![str(", ")]),
            str("\nCharacter styles: "),
            var("character").call("join", vec![str(", ")]),
        ]))),
    }
    Ok(Script::with_document(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(name: &str, args: serde_json::Value) -> String {
        let catalog = crate::catalog::Catalog::builtin();
        let op = catalog.get(name).unwrap();
        op.render(&op.validate(&args).unwrap()).unwrap().into_string()
    }

    #[test]
    fn alignment_maps_to_justification() {
        let out = render(
            "create_paragraph_style",
            json!({ "name": "Body", "alignment": "justify" }),
        );
        assert!(out.contains("style.justification = Justification.LEFT_JUSTIFIED;"));
        assert!(!out.contains("pointSize"));
    }

    #[test]
    fn existing_style_is_reported_not_recreated() {
        let out = render("create_character_style", json!({ "name": "Em" }));
        assert!(out.contains("doc.characterStyles.itemByName(\"Em\").isValid"));
        assert!(out.contains(r#""Character style \'Em\' already exists";"#));
    }
}
