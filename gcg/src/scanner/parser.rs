//! Declaration model for Go sources, built from a tree-sitter-go syntax tree.
//!
//! Only top-level structure is modelled: the package clause, imports, type
//! declarations (with struct fields) and function declarations. Every node
//! keeps the byte span it was parsed from.

use std::borrow::Cow;
use tree_sitter::{Node, Parser};

use super::tags::StructTag;
use super::{ParseError, Span};

/// Parsed view of one Go source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub package: Ident,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn type_decls(&self) -> impl Iterator<Item = &TypeDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Type(t) => Some(t),
            _ => None,
        })
    }

    pub fn func_decls(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit package name, including `.` and `_`.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Type(TypeDecl),
    Func(FuncDecl),
    /// `var` or `const`.
    Value(Span),
}

/// A `type` declaration, single or grouped.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// From the `type` keyword through the last spec or closing paren.
    pub span: Span,
    pub grouped: bool,
    pub doc: Option<String>,
    pub specs: Vec<TypeSpec>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// From the type name through the end of the type expression.
    pub span: Span,
    /// Doc comment of the spec itself; only set inside grouped declarations.
    pub doc: Option<String>,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone)]
pub struct TypeExpr {
    pub span: Span,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    Struct(Vec<FieldDecl>),
    Other,
}

/// One line of a struct body.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Empty for embedded fields.
    pub names: Vec<Ident>,
    pub ty: TypeExpr,
    pub tag: Option<StructTag>,
    pub doc: Option<String>,
    /// Comment trailing the field on the same line.
    pub comment: Option<String>,
    pub span: Span,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: Ident,
    pub receiver: Option<Receiver>,
    /// From the `func` keyword through the closing brace of the body.
    pub span: Span,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receiver {
    /// Base type name with pointer and type arguments stripped.
    pub type_name: String,
    pub pointer: bool,
}

/// Parse a Go source file.
///
/// Any syntax error reported by the grammar fails the whole file.
pub fn parse_file(src: &str) -> Result<SourceFile, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ParseError::at(src, 0, format!("cannot load Go grammar: {e}")))?;

    // Same byte length as the BOM, so offsets keep pointing into `src`.
    let text = match src.strip_prefix('\u{feff}') {
        Some(rest) => Cow::Owned(format!("   {rest}")),
        None => Cow::Borrowed(src),
    };
    let tree = parser
        .parse(text.as_ref(), None)
        .ok_or_else(|| ParseError::at(src, 0, "parser produced no tree"))?;

    let root = tree.root_node();
    if let Some(bad) = first_error(root) {
        let message = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            let text = src.get(bad.byte_range()).unwrap_or_default();
            let near: String = text.lines().next().unwrap_or_default().chars().take(24).collect();
            format!("syntax error near {near:?}")
        };
        return Err(ParseError::at(src, bad.start_byte(), message));
    }

    Walker { src }.source_file(root)
}

/// First error or missing node in document order.
fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

struct Walker<'a> {
    src: &'a str,
}

impl<'a> Walker<'a> {
    fn source_file(&self, root: Node) -> Result<SourceFile, ParseError> {
        let mut cursor = root.walk();
        let nodes: Vec<Node> = root
            .named_children(&mut cursor)
            .filter(|n| n.kind() != "comment")
            .collect();

        let package = nodes
            .first()
            .filter(|n| n.kind() == "package_clause")
            .and_then(|n| first_named_of_kind(*n, "package_identifier"))
            .map(|n| self.ident(n))
            .ok_or_else(|| {
                let at = nodes.first().map(|n| n.start_byte()).unwrap_or(0);
                ParseError::at(self.src, at, "expected 'package' clause")
            })?;

        let mut file = SourceFile {
            package,
            imports: Vec::new(),
            decls: Vec::new(),
        };
        for node in nodes.iter().skip(1) {
            match node.kind() {
                "import_declaration" => self.import_decl(*node, &mut file.imports)?,
                "type_declaration" => file.decls.push(Decl::Type(self.type_decl(*node)?)),
                "function_declaration" | "method_declaration" => file.decls.push(Decl::Func(self.func_decl(*node)?)),
                "var_declaration" | "const_declaration" => file.decls.push(Decl::Value(span_of(*node))),
                _ => {}
            }
        }
        Ok(file)
    }

    fn import_decl(&self, node: Node, imports: &mut Vec<ImportSpec>) -> Result<(), ParseError> {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => imports.push(self.import_spec(child)?),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner).filter(|n| n.kind() == "import_spec") {
                        imports.push(self.import_spec(spec)?);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn import_spec(&self, node: Node) -> Result<ImportSpec, ParseError> {
        let path_node = self.field(node, "path")?;
        let path = unquote(self.text(path_node))
            .ok_or_else(|| ParseError::at(self.src, path_node.start_byte(), "invalid import path"))?;
        Ok(ImportSpec {
            alias: node.child_by_field_name("name").map(|n| self.text(n).to_string()),
            path,
            span: span_of(node),
        })
    }

    fn type_decl(&self, node: Node) -> Result<TypeDecl, ParseError> {
        let mut cursor = node.walk();
        let grouped = node.children(&mut cursor).any(|c| c.kind() == "(");

        let mut specs = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if matches!(child.kind(), "type_spec" | "type_alias") {
                let doc = if grouped { self.doc_for(child) } else { None };
                specs.push(self.type_spec(child, doc)?);
            }
        }

        Ok(TypeDecl {
            span: span_of(node),
            grouped,
            doc: self.doc_for(node),
            specs,
        })
    }

    fn type_spec(&self, node: Node, doc: Option<String>) -> Result<TypeSpec, ParseError> {
        Ok(TypeSpec {
            name: self.ident(self.field(node, "name")?),
            span: span_of(node),
            doc,
            alias: node.kind() == "type_alias",
            ty: self.type_expr(self.field(node, "type")?)?,
        })
    }

    fn type_expr(&self, node: Node) -> Result<TypeExpr, ParseError> {
        let kind = match first_named_of_kind(node, "field_declaration_list") {
            Some(list) if node.kind() == "struct_type" => TypeKind::Struct(self.struct_fields(list)?),
            _ => TypeKind::Other,
        };
        Ok(TypeExpr {
            span: span_of(node),
            kind,
        })
    }

    fn struct_fields(&self, list: Node) -> Result<Vec<FieldDecl>, ParseError> {
        let mut cursor = list.walk();
        let nodes: Vec<Node> = list
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .collect();
        nodes.into_iter().map(|n| self.field_decl(n)).collect()
    }

    fn field_decl(&self, node: Node) -> Result<FieldDecl, ParseError> {
        let mut cursor = node.walk();
        let names: Vec<Ident> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.ident(n))
            .collect();

        let type_node = self.field(node, "type")?;
        let mut ty = self.type_expr(type_node)?;
        if names.is_empty() {
            // `*Base`: the star is not part of the grammar's type node.
            ty.span.start = node.start_byte();
        }

        let tag = match node.child_by_field_name("tag") {
            Some(tag) => Some(StructTag::new(
                unquote(self.text(tag)).ok_or_else(|| ParseError::at(self.src, tag.start_byte(), "invalid struct tag"))?,
            )),
            None => None,
        };

        Ok(FieldDecl {
            names,
            ty,
            tag,
            doc: self.doc_for(node),
            comment: self.trailing_comment(node),
            span: span_of(node),
        })
    }

    fn func_decl(&self, node: Node) -> Result<FuncDecl, ParseError> {
        let receiver = match node.child_by_field_name("receiver") {
            Some(list) => Some(self.receiver(list)?),
            None => None,
        };
        Ok(FuncDecl {
            name: self.ident(self.field(node, "name")?),
            receiver,
            span: span_of(node),
            doc: self.doc_for(node),
        })
    }

    fn receiver(&self, list: Node) -> Result<Receiver, ParseError> {
        let ty = first_named_of_kind(list, "parameter_declaration")
            .and_then(|param| param.child_by_field_name("type"))
            .ok_or_else(|| ParseError::at(self.src, list.start_byte(), "receiver has no type"))?;

        let mut pointer = false;
        let mut node = ty;
        loop {
            match node.kind() {
                "pointer_type" => pointer = true,
                "parenthesized_type" => {}
                "generic_type" => {
                    node = self.field(node, "type")?;
                    continue;
                }
                _ => break,
            }
            node = node
                .named_child(0)
                .ok_or_else(|| ParseError::at(self.src, node.start_byte(), "receiver has no type"))?;
        }

        Ok(Receiver {
            type_name: self.text(node).to_string(),
            pointer,
        })
    }

    /// Comment group ending on the line right above `node`, unless its first
    /// comment trails a token on the same line.
    fn doc_for(&self, node: Node) -> Option<String> {
        let mut group = Vec::new();
        let mut next_row = node.start_position().row;
        let mut prev = prev_token(node);
        while let Some(comment) = prev.filter(|n| n.kind() == "comment") {
            let end_row = comment.end_position().row;
            let adjacent = if group.is_empty() {
                end_row + 1 == next_row
            } else {
                end_row + 1 >= next_row
            };
            if !adjacent {
                break;
            }
            group.push(comment);
            next_row = comment.start_position().row;
            prev = prev_token(comment);
        }

        let first = group.last()?;
        if let Some(before) = prev
            && before.end_position().row == first.start_position().row
        {
            return None;
        }

        let texts: Vec<&str> = group.iter().rev().map(|c| self.text(*c)).collect();
        Some(texts.join("\n"))
    }

    fn trailing_comment(&self, node: Node) -> Option<String> {
        let next = node.next_sibling()?;
        (next.kind() == "comment" && next.start_position().row == node.end_position().row)
            .then(|| self.text(next).to_string())
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ParseError> {
        node.child_by_field_name(name)
            .ok_or_else(|| ParseError::at(self.src, node.start_byte(), format!("{} without {name}", node.kind())))
    }

    fn ident(&self, node: Node) -> Ident {
        Ident {
            name: self.text(node).to_string(),
            span: span_of(node),
        }
    }

    fn text(&self, node: Node) -> &'a str {
        &self.src[node.byte_range()]
    }
}

fn span_of(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn first_named_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|n| n.kind() == kind);
    found
}

/// Previous sibling, ignoring newline terminators.
fn prev_token(node: Node) -> Option<Node> {
    let mut prev = node.prev_sibling();
    while let Some(n) = prev {
        if n.kind() != "\n" {
            return Some(n);
        }
        prev = n.prev_sibling();
    }
    None
}

/// Decode an interpreted (`"..."`) or raw (`` `...` ``) Go string literal.
pub(crate) fn unquote(literal: &str) -> Option<String> {
    if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        return Some(raw.replace('\r', ""));
    }
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'a' => '\u{7}',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{b}',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            'x' => hex_char(&mut chars, 2)?,
            'u' => hex_char(&mut chars, 4)?,
            'U' => hex_char(&mut chars, 8)?,
            d @ '0'..='7' => {
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    value = value * 8 + chars.next()?.to_digit(8)?;
                }
                char::from_u32(value)?
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

fn hex_char(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}
