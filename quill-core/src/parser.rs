#[derive(Parser)]
#[grammar = "quill.pest"]
pub struct QuillParser;

/// Keyword tokens carry no information the AST needs.
pub(crate) fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_import
            | Rule::kw_class
            | Rule::kw_trait
            | Rule::kw_fn
            | Rule::kw_if
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_new
    )
}
