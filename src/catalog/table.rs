use super::{with_text_frame, OperationDef, ParamSpec, Params};
use crate::{
    error::ParamError,
    script::{concat, if_else, int, let_, result, set, str, var, BinOp, Expr, Script},
};

pub(super) fn operations() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            "create_table",
            "Create Table",
            "Insert a table at the end of a text frame's story, optionally filled row by row",
            create_table,
        )
        .param(ParamSpec::integer("frame_id", "Text frame id").required())
        .param(ParamSpec::integer("rows", "Total row count, header rows included").range(1.0, 500.0).required())
        .param(ParamSpec::integer("columns", "Column count").range(1.0, 100.0).required())
        .param(ParamSpec::integer("header_rows", "Header row count").range(0.0, 25.0).default_int(0))
        .param(ParamSpec::text_list(
            "contents",
            "Cell texts in row-major order; missing cells stay empty",
        )),
        OperationDef::new(
            "set_table_cell",
            "Set Table Cell",
            "Set the text of one table cell",
            set_table_cell,
        )
        .param(ParamSpec::integer("frame_id", "Text frame id").required())
        .param(ParamSpec::integer("table", "Table number within the story (1-based)").min(1.0).default_int(1))
        .param(ParamSpec::integer("row", "Row number (1-based)").min(1.0).required())
        .param(ParamSpec::integer("column", "Column number (1-based)").min(1.0).required())
        .param(ParamSpec::text("content", "Cell text").allow_empty().required()),
    ]
}

fn create_table(params: &Params) -> Result<Script, ParamError> {
    let id = params.require_integer("frame_id")?;
    let rows = params.require_integer("rows")?;
    let columns = params.require_integer("columns")?;
    let headers = params.require_integer("header_rows")?;
    if headers >= rows {
        return Err(ParamError::Invalid {
            name: "header_rows".into(),
            reason: format!("must be less than rows ({})", rows),
        });
    }

    let mut body = vec![let_(
        "table",
        var("frame")
            .dot("parentStory")
            .dot("insertionPoints")
            .at(int(-1))
            .dot("tables")
            .call(
                "add",
                vec![Expr::Object(vec![
                    ("bodyRowCount", int(rows - headers)),
                    ("columnCount", int(columns)),
                    ("headerRowCount", int(headers)),
                ])],
            ),
    )];

    if let Some(contents) = params.text_list("contents") {
        let cells = usize::try_from(rows * columns).unwrap_or(usize::MAX);
        if contents.len() > cells {
            return Err(ParamError::Invalid {
                name: "contents".into(),
                reason: format!("{} values for {} cells", contents.len(), cells),
            });
        }
        let mut padded = contents.to_vec();
        padded.resize(cells, String::new());
        body.push(set(
            var("table").dot("contents"),
            Expr::Array(padded.into_iter().map(str).collect()),
        ));
    }

    body.push(result(str(format!(
        "Created {}x{} table in text frame {}",
        rows, columns, id
    ))));
    Ok(Script::with_document(with_text_frame(id, body)))
}

fn set_table_cell(params: &Params) -> Result<Script, ParamError> {
    let id = params.require_integer("frame_id")?;
    let table = params.require_integer("table")?;
    let row = params.require_integer("row")?;
    let column = params.require_integer("column")?;
    let tables = || var("frame").dot("parentStory").dot("tables");
    let t = || var("table");

    let body = vec![if_else(
        tables().len().bin(BinOp::Lt, int(table)),
        vec![result(str(format!("Table {} not found in text frame {}", table, id)))],
        vec![
            let_("table", tables().at(int(table - 1))),
            if_else(
                t().dot("rows").len().bin(BinOp::Lt, int(row))
                    .bin(BinOp::Or, t().dot("columns").len().bin(BinOp::Lt, int(column))),
                vec![result(concat([
                    str(format!("Cell ({}, {}) is outside the ", row, column)),
                    t().dot("rows").len(),
                    str("x"),
                    t().dot("columns").len(),
                    str(" table"),
                ]))],
                vec![
                    set(
                        t().dot("rows").at(int(row - 1)).dot("cells").at(int(column - 1)).dot("contents"),
                        params.require_expr("content")?,
                    ),
                    result(str(format!("Set cell ({}, {}) of table {}", row, column, table))),
                ],
            ),
        ],
    )];
    Ok(Script::with_document(with_text_frame(id, body)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use serde_json::json;

    fn render(args: serde_json::Value) -> Result<String, ParamError> {
        let catalog = Catalog::builtin();
        let op = catalog.get("create_table").unwrap();
        Ok(op.render(&op.validate(&args)?)?.into_string())
    }

    #[test]
    fn contents_are_padded_to_the_grid() {
        let out = render(json!({ "frame_id": 7, "rows": 2, "columns": 2, "contents": ["a", "b", "c"] }))
            .unwrap();
        assert!(out.contains("table.contents = [\"a\", \"b\", \"c\", \"\"];"));
        assert!(out.contains("bodyRowCount: 2, columnCount: 2, headerRowCount: 0"));
    }

    #[test]
    fn rejects_overfull_contents_and_all_header_tables() {
        assert!(matches!(
            render(json!({ "frame_id": 7, "rows": 1, "columns": 1, "contents": ["a", "b"] })),
            Err(ParamError::Invalid { .. })
        ));
        assert!(matches!(
            render(json!({ "frame_id": 7, "rows": 2, "columns": 1, "header_rows": 2 })),
            Err(ParamError::Invalid { .. })
        ));
    }
}
