//! Signature Printer - canonical one-line Go rendering
//!
//! Renders function headers and type expressions with gofmt spacing,
//! whatever line breaks the source used. Bodies are never printed.

use crate::frontend::ast::*;

/// Printer for declaration headers and type expressions
pub struct SignaturePrinter {
    output: String,
}

impl SignaturePrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Print `func (recv) Name[T any](params) results`
    pub fn print_func_header(&mut self, func: &FuncDecl) -> String {
        self.output.clear();
        self.output.push_str("func ");
        if let Some(recv) = &func.recv {
            self.output.push('(');
            self.print_group(recv);
            self.output.push_str(") ");
        }
        self.output.push_str(&func.name.name);
        if !func.signature.type_params.is_empty() {
            self.print_groups(&func.signature.type_params, '[', ']');
        }
        self.print_signature(&func.signature);
        std::mem::take(&mut self.output)
    }

    /// Print a single type expression
    pub fn print_type_expr(&mut self, ty: &TypeExpr) -> String {
        self.output.clear();
        self.print_type(ty);
        std::mem::take(&mut self.output)
    }

    /// Parameters and results, without type parameters
    fn print_signature(&mut self, sig: &Signature) {
        self.print_groups(&sig.params, '(', ')');
        match sig.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.output.push(' ');
                self.print_type(&single.ty);
            }
            results => {
                self.output.push(' ');
                self.print_groups(results, '(', ')');
            }
        }
    }

    fn print_groups(&mut self, groups: &[ParamGroup], open: char, close: char) {
        self.output.push(open);
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print_group(group);
        }
        self.output.push(close);
    }

    fn print_group(&mut self, group: &ParamGroup) {
        if !group.names.is_empty() {
            self.print_names(&group.names);
            self.output.push(' ');
        }
        self.print_type(&group.ty);
    }

    fn print_names(&mut self, names: &[Ident]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&name.name);
        }
    }

    fn print_type(&mut self, ty: &TypeExpr) {
        match ty {
            TypeExpr::Name(ident) => self.output.push_str(&ident.name),
            TypeExpr::Qualified { package, name } => {
                self.output.push_str(&package.name);
                self.output.push('.');
                self.output.push_str(&name.name);
            }
            TypeExpr::Generic { base, args } => {
                self.print_type(base);
                self.output.push('[');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_type(arg);
                }
                self.output.push(']');
            }
            TypeExpr::Pointer(inner) => {
                self.output.push('*');
                self.print_type(inner);
            }
            TypeExpr::Slice(elem) => {
                self.output.push_str("[]");
                self.print_type(elem);
            }
            TypeExpr::Array { len, elem } => {
                self.output.push('[');
                self.output.push_str(len);
                self.output.push(']');
                self.print_type(elem);
            }
            TypeExpr::Map { key, value } => {
                self.output.push_str("map[");
                self.print_type(key);
                self.output.push(']');
                self.print_type(value);
            }
            TypeExpr::Chan { dir, elem } => {
                self.output.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.print_type(elem);
            }
            TypeExpr::Func(sig) => {
                self.output.push_str("func");
                self.print_signature(sig);
            }
            TypeExpr::Struct(fields) => self.print_struct(fields),
            TypeExpr::Interface(elems) => self.print_interface(elems),
            TypeExpr::Tilde(inner) => {
                self.output.push('~');
                self.print_type(inner);
            }
            TypeExpr::Union(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(" | ");
                    }
                    self.print_type(term);
                }
            }
            TypeExpr::Ellipsis(elem) => {
                self.output.push_str("...");
                self.print_type(elem);
            }
            TypeExpr::Paren(inner) => {
                self.output.push('(');
                self.print_type(inner);
                self.output.push(')');
            }
        }
    }

    fn print_struct(&mut self, fields: &[FieldDecl]) {
        if fields.is_empty() {
            self.output.push_str("struct{}");
            return;
        }
        self.output.push_str("struct{ ");
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                self.output.push_str("; ");
            }
            if !field.names.is_empty() {
                self.print_names(&field.names);
                self.output.push(' ');
            }
            self.print_type(&field.ty);
            if let Some(tag) = &field.tag {
                self.output.push(' ');
                self.output.push_str(tag);
            }
        }
        self.output.push_str(" }");
    }

    fn print_interface(&mut self, elems: &[InterfaceElem]) {
        if elems.is_empty() {
            self.output.push_str("interface{}");
            return;
        }
        self.output.push_str("interface{ ");
        for (i, elem) in elems.iter().enumerate() {
            if i > 0 {
                self.output.push_str("; ");
            }
            match elem {
                InterfaceElem::Method { name, signature } => {
                    self.output.push_str(&name.name);
                    self.print_signature(signature);
                }
                InterfaceElem::Embed(ty) => self.print_type(ty),
            }
        }
        self.output.push_str(" }");
    }
}

impl Default for SignaturePrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a function header on one line
pub fn render_func_header(func: &FuncDecl) -> String {
    SignaturePrinter::new().print_func_header(func)
}

/// Render a type expression on one line
pub fn render_type(ty: &TypeExpr) -> String {
    SignaturePrinter::new().print_type_expr(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use pretty_assertions::assert_eq;

    fn headers(source: &str) -> Vec<String> {
        let lexer = Lexer::new(source, 0);
        let mut parser = Parser::new(lexer);
        let file = parser.parse_file().unwrap();
        file.functions().map(render_func_header).collect()
    }

    #[test]
    fn test_print_simple_function() {
        assert_eq!(headers("package p\nfunc F() S { return S{} }\n"), vec!["func F() S"]);
    }

    #[test]
    fn test_print_grouped_params_and_results() {
        assert_eq!(
            headers("package p\nfunc F(a,b int,  rest ...string) (s S, err error) {}\n"),
            vec!["func F(a, b int, rest ...string) (s S, err error)"]
        );
    }

    #[test]
    fn test_print_joins_multiline_signature() {
        let source = "package p\nfunc (c *Client) Do(\n\tctx context.Context,\n\treq *Request,\n) (\n\tResponse,\n\terror,\n) {\n}\n";
        assert_eq!(
            headers(source),
            vec!["func (c *Client) Do(ctx context.Context, req *Request) (Response, error)"]
        );
    }

    #[test]
    fn test_print_generics() {
        assert_eq!(
            headers("package p\nfunc Keys[K comparable, V any](m map[K]V) []K { return nil }\nfunc (l List[T]) Head() T { return l.items[0] }\n"),
            vec![
                "func Keys[K comparable, V any](m map[K]V) []K",
                "func (l List[T]) Head() T",
            ]
        );
    }

    #[test]
    fn test_print_composite_types() {
        let source = "package p\nfunc F(a [4]int, b <-chan int, c chan<- S, d func(int) error, e interface{}) struct {\n\tX int `json:\"x\"`\n\tY, Z string\n} {\n}\n";
        assert_eq!(
            headers(source),
            vec!["func F(a [4]int, b <-chan int, c chan<- S, d func(int) error, e interface{}) struct{ X int `json:\"x\"`; Y, Z string }"]
        );
    }

    #[test]
    fn test_print_type_expr() {
        let source = "package p\ntype C interface {\n\t~int | ~string\n\tString() string\n}\n";
        let lexer = Lexer::new(source, 0);
        let file = Parser::new(lexer).parse_file().unwrap();
        let spec = file.type_specs().next().unwrap();
        assert_eq!(render_type(&spec.ty), "interface{ ~int | ~string; String() string }");
    }
}
