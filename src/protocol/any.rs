//! The `Any`/`Expression` visitor surface (§6.5).
//!
//! Scalar values, CRUD criteria, and bind arguments are all carried by the
//! message types in [`super::message`] as raw, undecoded bytes, since the
//! full `Any`/`Expression` grammar sits above the wire protocol this engine
//! owns. These traits are the narrow interface a caller implements over its
//! own value/expression types to walk that grammar; no concrete AST or
//! parser lives in this crate. Shaped as a flat event stream (`list_begin`/
//! `list_end`, `document_begin`/`document_field`/`document_end` bracket
//! their nested values) rather than a recursive tree, so the trait stays
//! object-safe.

/// One step of a document path (e.g. `$.a.b[0].**.c`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DocumentPathStep {
    /// A named member access (`.foo`).
    Member,
    /// A wildcard member access (`.*`).
    MemberAsterisk,
    /// An indexed array access (`[3]`).
    ArrayIndex,
    /// A wildcard array access (`[*]`).
    ArrayIndexAsterisk,
    /// Recursive descent through any number of levels (`**`).
    DoubleAsterisk,
}

/// Visits the scalar/list/document value grammar shared by `Any` and
/// `Expression`.
pub trait AnyVisitor {
    /// A `NULL` scalar.
    fn null(&mut self);
    /// A UTF-8 string scalar.
    fn string(&mut self, value: &str);
    /// A string scalar tagged with an explicit MySQL character set id.
    fn string_with_charset(&mut self, value: &[u8], charset_id: u32);
    /// A signed 64-bit integer scalar.
    fn int64(&mut self, value: i64);
    /// An unsigned 64-bit integer scalar.
    fn uint64(&mut self, value: u64);
    /// A 32-bit float scalar.
    fn float(&mut self, value: f32);
    /// A 64-bit double scalar.
    fn double(&mut self, value: f64);
    /// A boolean scalar.
    fn bool(&mut self, value: bool);
    /// An opaque byte-string scalar.
    fn bytes(&mut self, value: &[u8]);
    /// The start of a list value; each element is visited in turn.
    fn list_begin(&mut self);
    /// The end of the innermost open list.
    fn list_end(&mut self);
    /// The start of a document value.
    fn document_begin(&mut self);
    /// A document field's key, immediately followed by its value's visit.
    fn document_field(&mut self, key: &str);
    /// The end of the innermost open document.
    fn document_end(&mut self);
}

/// Extends [`AnyVisitor`] with the placeholder/identifier/operator grammar
/// an `Expression` tree adds on top of plain values.
pub trait ExpressionVisitor: AnyVisitor {
    /// A session/system variable reference.
    fn variable(&mut self, name: &str);
    /// A bare column/field identifier.
    fn identifier(&mut self, name: &str);
    /// A column/field identifier qualified by a document path.
    fn identifier_with_path(&mut self, name: &str, path: &[DocumentPathStep]);
    /// A document path applied to the current document value.
    fn document_path(&mut self, path: &[DocumentPathStep]);
    /// An operator application (e.g. `+`, `==`); its `arg_count` operands
    /// are visited immediately afterward.
    fn operator(&mut self, name: &str, arg_count: usize);
    /// A function call; its `arg_count` arguments are visited immediately
    /// afterward.
    fn function_call(&mut self, name: &str, arg_count: usize);
    /// A `?`-style positional bind placeholder.
    fn positional_placeholder(&mut self, position: u32);
    /// A `:name`-style named bind placeholder.
    fn named_placeholder(&mut self, name: &str);
    /// An unnamed bind placeholder, bound by call order.
    fn unnamed_placeholder(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl AnyVisitor for Recorder {
        fn null(&mut self) {
            self.0.push("null".into());
        }
        fn string(&mut self, value: &str) {
            self.0.push(format!("string({value})"));
        }
        fn string_with_charset(&mut self, value: &[u8], charset_id: u32) {
            self.0.push(format!("string_with_charset({charset_id},{value:?})"));
        }
        fn int64(&mut self, value: i64) {
            self.0.push(format!("int64({value})"));
        }
        fn uint64(&mut self, value: u64) {
            self.0.push(format!("uint64({value})"));
        }
        fn float(&mut self, value: f32) {
            self.0.push(format!("float({value})"));
        }
        fn double(&mut self, value: f64) {
            self.0.push(format!("double({value})"));
        }
        fn bool(&mut self, value: bool) {
            self.0.push(format!("bool({value})"));
        }
        fn bytes(&mut self, value: &[u8]) {
            self.0.push(format!("bytes({value:?})"));
        }
        fn list_begin(&mut self) {
            self.0.push("list_begin".into());
        }
        fn list_end(&mut self) {
            self.0.push("list_end".into());
        }
        fn document_begin(&mut self) {
            self.0.push("document_begin".into());
        }
        fn document_field(&mut self, key: &str) {
            self.0.push(format!("document_field({key})"));
        }
        fn document_end(&mut self) {
            self.0.push("document_end".into());
        }
    }

    impl ExpressionVisitor for Recorder {
        fn variable(&mut self, name: &str) {
            self.0.push(format!("variable({name})"));
        }
        fn identifier(&mut self, name: &str) {
            self.0.push(format!("identifier({name})"));
        }
        fn identifier_with_path(&mut self, name: &str, path: &[DocumentPathStep]) {
            self.0.push(format!("identifier_with_path({name},{path:?})"));
        }
        fn document_path(&mut self, path: &[DocumentPathStep]) {
            self.0.push(format!("document_path({path:?})"));
        }
        fn operator(&mut self, name: &str, arg_count: usize) {
            self.0.push(format!("operator({name},{arg_count})"));
        }
        fn function_call(&mut self, name: &str, arg_count: usize) {
            self.0.push(format!("function_call({name},{arg_count})"));
        }
        fn positional_placeholder(&mut self, position: u32) {
            self.0.push(format!("positional_placeholder({position})"));
        }
        fn named_placeholder(&mut self, name: &str) {
            self.0.push(format!("named_placeholder({name})"));
        }
        fn unnamed_placeholder(&mut self) {
            self.0.push("unnamed_placeholder".into());
        }
    }

    #[test]
    fn visits_a_list_of_scalars_in_order() {
        let mut r = Recorder::default();
        r.list_begin();
        r.int64(1);
        r.string("two");
        r.list_end();
        assert_eq!(r.0, vec!["list_begin", "int64(1)", "string(two)", "list_end"]);
    }

    #[test]
    fn visits_a_qualified_identifier_expression() {
        let mut r = Recorder::default();
        r.identifier_with_path("doc", &[DocumentPathStep::Member, DocumentPathStep::ArrayIndex]);
        assert_eq!(
            r.0,
            vec!["identifier_with_path(doc,[Member, ArrayIndex])".to_string()]
        );
    }
}
