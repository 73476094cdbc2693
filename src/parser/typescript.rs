//! Syntax-level queries over TypeScript / JavaScript trees: import and export
//! declarations, declared names, and lexical scope lookup.

use tree_sitter::Node;

/// What kind of declaration a definition points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Function,
    Class,
    Variable,
    Interface,
    Type,
    Enum,
    Namespace,
    Parameter,
    TypeParameter,
    Export,
    NamespaceImport,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Function => "function",
            DefinitionKind::Class => "class",
            DefinitionKind::Variable => "variable",
            DefinitionKind::Interface => "interface",
            DefinitionKind::Type => "type",
            DefinitionKind::Enum => "enum",
            DefinitionKind::Namespace => "namespace",
            DefinitionKind::Parameter => "parameter",
            DefinitionKind::TypeParameter => "type-parameter",
            DefinitionKind::Export => "export",
            DefinitionKind::NamespaceImport => "namespace-import",
        }
    }

    fn of_declaration(kind: &str) -> Option<Self> {
        match kind {
            "function_declaration" | "generator_function_declaration" | "function_signature" => {
                Some(DefinitionKind::Function)
            }
            "class_declaration" | "abstract_class_declaration" => Some(DefinitionKind::Class),
            "interface_declaration" => Some(DefinitionKind::Interface),
            "type_alias_declaration" => Some(DefinitionKind::Type),
            "enum_declaration" => Some(DefinitionKind::Enum),
            "internal_module" | "module" => Some(DefinitionKind::Namespace),
            _ => None,
        }
    }
}

/// Name a binding imports from its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    Default,
    Named(String),
    Namespace,
}

impl ImportedName {
    fn from_export_name(name: &str) -> Self {
        if name == "default" {
            ImportedName::Default
        } else {
            ImportedName::Named(name.to_string())
        }
    }

    pub fn export_name(&self) -> Option<&str> {
        match self {
            ImportedName::Default => Some("default"),
            ImportedName::Named(name) => Some(name),
            ImportedName::Namespace => None,
        }
    }
}

/// Where a name in scope comes from.
#[derive(Debug, Clone)]
pub enum Binding<'t> {
    Local {
        node: Node<'t>,
        kind: DefinitionKind,
    },
    Import {
        statement: Node<'t>,
        specifier: String,
        imported: ImportedName,
    },
}

#[derive(Debug, Clone)]
pub struct ImportSpec<'t> {
    pub imported: String,
    pub local: Node<'t>,
    pub line_node: Node<'t>,
}

/// A top-level `import ... from "x"` or `export ... from "x"` statement.
#[derive(Debug, Clone)]
pub struct ImportDecl<'t> {
    pub statement: Node<'t>,
    pub specifier: String,
    pub default: Option<Node<'t>>,
    pub namespace: Option<Node<'t>>,
    pub named: Vec<ImportSpec<'t>>,
    pub is_reexport: bool,
}

pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Text of an identifier including the trivia before it, back to the end of
/// the previous token.
pub fn full_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    let mut current = node;
    let start = loop {
        if let Some(prev) = current.prev_sibling() {
            break prev.end_byte();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break 0,
        }
    };
    source.get(start..node.end_byte()).unwrap_or("")
}

pub fn is_reference_identifier(node: Node<'_>) -> bool {
    match node.kind() {
        "identifier" | "shorthand_property_identifier" | "shorthand_property_identifier_pattern" => {
            true
        }
        "type_identifier" => node
            .parent()
            .map_or(true, |parent| parent.kind() != "nested_type_identifier")
            || qualifier_of(node).is_some(),
        "property_identifier" => qualifier_of(node).is_some(),
        _ => false,
    }
}

/// The plain identifier before the dot when `node` is the member name of
/// `ns.member` or `Ns.Type`.
fn qualifier_of(node: Node<'_>) -> Option<Node<'_>> {
    let parent = node.parent()?;
    let (qualifier_field, member_field) = match parent.kind() {
        "member_expression" => ("object", "property"),
        "nested_type_identifier" => ("module", "name"),
        _ => return None,
    };
    if parent.child_by_field_name(member_field)? != node {
        return None;
    }
    parent
        .child_by_field_name(qualifier_field)
        .filter(|qualifier| qualifier.kind() == "identifier")
}

/// Splits a qualified member reference into the qualifying identifier and the
/// member name, so `api.fetchUser` can be looked up through `import * as api`.
pub fn namespace_member<'t, 'a>(node: Node<'t>, source: &'a str) -> Option<(Node<'t>, &'a str)> {
    if !matches!(node.kind(), "property_identifier" | "type_identifier") {
        return None;
    }
    qualifier_of(node).map(|qualifier| (qualifier, node_text(node, source)))
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

fn child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node).into_iter().find(|child| child.kind() == kind)
}

fn string_value(node: Node<'_>, source: &str) -> String {
    node_text(node, source)
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

fn statement_source(statement: Node<'_>, source: &str) -> Option<String> {
    statement
        .child_by_field_name("source")
        .or_else(|| child_of_kind(statement, "string"))
        .map(|node| string_value(node, source))
}

/// Names bound by a destructuring pattern or parameter.
fn collect_binding_names<'t>(pattern: Node<'t>, out: &mut Vec<Node<'t>>) {
    match pattern.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => out.push(pattern),
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = pattern.child_by_field_name("left") {
                collect_binding_names(left, out);
            }
        }
        "pair_pattern" => {
            if let Some(value) = pattern.child_by_field_name("value") {
                collect_binding_names(value, out);
            }
        }
        "required_parameter" | "optional_parameter" => {
            if let Some(inner) = pattern.child_by_field_name("pattern") {
                collect_binding_names(inner, out);
            }
        }
        "rest_pattern" | "object_pattern" | "array_pattern" => {
            for child in named_children(pattern) {
                collect_binding_names(child, out);
            }
        }
        _ => {}
    }
}

fn binds_name(pattern: Node<'_>, name: &str, source: &str) -> bool {
    let mut names = Vec::new();
    collect_binding_names(pattern, &mut names);
    names.iter().any(|node| node_text(*node, source) == name)
}

/// Names introduced by a declaration statement, with the node that declares
/// each one.
pub fn declared_names<'t>(
    declaration: Node<'t>,
    source: &str,
) -> Vec<(String, Node<'t>, DefinitionKind)> {
    match declaration.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut declared = Vec::new();
            for declarator in named_children(declaration) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let Some(pattern) = declarator.child_by_field_name("name") else {
                    continue;
                };
                let mut names = Vec::new();
                collect_binding_names(pattern, &mut names);
                declared.extend(names.into_iter().map(|name| {
                    (
                        node_text(name, source).to_string(),
                        declarator,
                        DefinitionKind::Variable,
                    )
                }));
            }
            declared
        }
        "export_statement" => declaration
            .child_by_field_name("declaration")
            .map(|inner| declared_names(inner, source))
            .unwrap_or_default(),
        "ambient_declaration" => named_children(declaration)
            .into_iter()
            .flat_map(|inner| declared_names(inner, source))
            .collect(),
        "expression_statement" => child_of_kind(declaration, "internal_module")
            .map(|inner| declared_names(inner, source))
            .unwrap_or_default(),
        kind => match (
            DefinitionKind::of_declaration(kind),
            declaration.child_by_field_name("name"),
        ) {
            (Some(definition_kind), Some(name)) => vec![(
                node_text(name, source).to_string(),
                declaration,
                definition_kind,
            )],
            _ => Vec::new(),
        },
    }
}

/// The node whose source is shown for a binding: declarators widen to their
/// statement, and `export` / `declare` wrappers are included.
pub fn definition_node(node: Node<'_>) -> Node<'_> {
    let mut current = match node.kind() {
        "variable_declarator" => node.parent().unwrap_or(node),
        _ => node,
    };
    let is_declaration = matches!(
        current.kind(),
        "lexical_declaration" | "variable_declaration"
    ) || DefinitionKind::of_declaration(current.kind()).is_some();
    if !is_declaration {
        return current;
    }
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "export_statement" | "ambient_declaration" => current = parent,
            "expression_statement" if current.kind() == "internal_module" => current = parent,
            _ => break,
        }
    }
    current
}

pub fn import_declaration<'t>(statement: Node<'t>, source: &str) -> Option<ImportDecl<'t>> {
    match statement.kind() {
        "import_statement" => {
            let specifier = statement
                .child_by_field_name("source")
                .map(|node| string_value(node, source))?;
            let mut decl = ImportDecl {
                statement,
                specifier,
                default: None,
                namespace: None,
                named: Vec::new(),
                is_reexport: false,
            };
            if let Some(clause) = child_of_kind(statement, "import_clause") {
                for part in named_children(clause) {
                    match part.kind() {
                        "identifier" => decl.default = Some(part),
                        "namespace_import" => decl.namespace = child_of_kind(part, "identifier"),
                        "named_imports" => decl.named = specifiers(part, "import_specifier", source),
                        _ => {}
                    }
                }
            }
            Some(decl)
        }
        "export_statement" => {
            let specifier = statement
                .child_by_field_name("source")
                .map(|node| string_value(node, source))?;
            let named = child_of_kind(statement, "export_clause")
                .map(|clause| specifiers(clause, "export_specifier", source))
                .unwrap_or_default();
            Some(ImportDecl {
                statement,
                specifier,
                default: None,
                namespace: None,
                named,
                is_reexport: true,
            })
        }
        _ => None,
    }
}

fn specifiers<'t>(list: Node<'t>, kind: &str, source: &str) -> Vec<ImportSpec<'t>> {
    named_children(list)
        .into_iter()
        .filter(|spec| spec.kind() == kind)
        .filter_map(|spec| {
            let name = spec.child_by_field_name("name")?;
            let local = spec.child_by_field_name("alias").unwrap_or(name);
            Some(ImportSpec {
                imported: string_value(name, source),
                local,
                line_node: spec,
            })
        })
        .collect()
}

/// Top-level import and re-export statements in document order.
pub fn import_declarations<'t>(root: Node<'t>, source: &str) -> Vec<ImportDecl<'t>> {
    named_children(root)
        .into_iter()
        .filter_map(|statement| import_declaration(statement, source))
        .collect()
}

fn import_binding<'t>(statement: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    let decl = import_declaration(statement, source).filter(|decl| !decl.is_reexport)?;
    let imported = if decl.default.is_some_and(|node| node_text(node, source) == name) {
        ImportedName::Default
    } else if decl
        .namespace
        .is_some_and(|node| node_text(node, source) == name)
    {
        ImportedName::Namespace
    } else {
        let spec = decl
            .named
            .iter()
            .find(|spec| node_text(spec.local, source) == name)?;
        ImportedName::from_export_name(&spec.imported)
    };
    Some(Binding::Import {
        statement,
        specifier: decl.specifier,
        imported,
    })
}

/// Binding for `name` among the direct statements of a block or program.
pub fn binding_in_statements<'t>(block: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    for statement in named_children(block) {
        if statement.kind() == "import_statement" {
            if let Some(binding) = import_binding(statement, name, source) {
                return Some(binding);
            }
            continue;
        }
        if let Some((_, node, kind)) = declared_names(statement, source)
            .into_iter()
            .find(|(declared, _, _)| declared == name)
        {
            return Some(Binding::Local { node, kind });
        }
    }
    None
}

fn parameter_binding<'t>(function: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    if let Some(param) = function.child_by_field_name("parameter") {
        if binds_name(param, name, source) {
            return Some(Binding::Local {
                node: param,
                kind: DefinitionKind::Parameter,
            });
        }
    }
    let params = function.child_by_field_name("parameters")?;
    named_children(params)
        .into_iter()
        .find(|param| binds_name(*param, name, source))
        .map(|node| Binding::Local {
            node,
            kind: DefinitionKind::Parameter,
        })
}

fn type_parameter_binding<'t>(owner: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    let params = owner.child_by_field_name("type_parameters")?;
    named_children(params)
        .into_iter()
        .filter(|param| param.kind() == "type_parameter")
        .find(|param| {
            param
                .child_by_field_name("name")
                .is_some_and(|param_name| node_text(param_name, source) == name)
        })
        .map(|node| Binding::Local {
            node,
            kind: DefinitionKind::TypeParameter,
        })
}

fn own_name_binding<'t>(
    node: Node<'t>,
    name: &str,
    source: &str,
    kind: DefinitionKind,
) -> Option<Binding<'t>> {
    node.child_by_field_name("name")
        .filter(|own| node_text(*own, source) == name)
        .map(|_| Binding::Local { node, kind })
}

fn binding_in_scope<'t>(scope: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    match scope.kind() {
        "program" | "statement_block" | "switch_case" | "switch_default" => {
            binding_in_statements(scope, name, source)
        }
        "function_expression" | "function" | "generator_function" => {
            parameter_binding(scope, name, source)
                .or_else(|| type_parameter_binding(scope, name, source))
                .or_else(|| own_name_binding(scope, name, source, DefinitionKind::Function))
        }
        "function_declaration"
        | "generator_function_declaration"
        | "function_signature"
        | "arrow_function"
        | "method_definition"
        | "method_signature" => parameter_binding(scope, name, source)
            .or_else(|| type_parameter_binding(scope, name, source)),
        "class" => type_parameter_binding(scope, name, source)
            .or_else(|| own_name_binding(scope, name, source, DefinitionKind::Class)),
        "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration" => type_parameter_binding(scope, name, source),
        "for_statement" => {
            let initializer = scope.child_by_field_name("initializer")?;
            declared_names(initializer, source)
                .into_iter()
                .find(|(declared, _, _)| declared == name)
                .map(|(_, node, kind)| Binding::Local { node, kind })
        }
        "for_in_statement" => scope
            .child_by_field_name("left")
            .filter(|left| binds_name(*left, name, source))
            .map(|node| Binding::Local {
                node,
                kind: DefinitionKind::Variable,
            }),
        "catch_clause" => scope
            .child_by_field_name("parameter")
            .filter(|param| binds_name(*param, name, source))
            .map(|node| Binding::Local {
                node,
                kind: DefinitionKind::Variable,
            }),
        _ => None,
    }
}

/// Identifiers inside `import { a as b }` and `export { a } from` resolve to
/// the imported module's export, whichever side of `as` they sit on.
fn specifier_binding<'t>(identifier: Node<'t>, source: &str) -> Option<Binding<'t>> {
    let spec = identifier.parent()?;
    if !matches!(spec.kind(), "import_specifier" | "export_specifier") {
        return None;
    }
    let statement = spec
        .parent()
        .and_then(|list| list.parent())
        .and_then(|clause| match clause.kind() {
            "import_clause" => clause.parent(),
            _ => Some(clause),
        })?;
    let decl = import_declaration(statement, source)?;
    let imported = string_value(spec.child_by_field_name("name")?, source);
    Some(Binding::Import {
        statement,
        specifier: decl.specifier,
        imported: ImportedName::from_export_name(&imported),
    })
}

/// Nearest lexical binding for an identifier, walking outward from it.
pub fn find_binding<'t>(identifier: Node<'t>, source: &str) -> Option<Binding<'t>> {
    if let Some(binding) = specifier_binding(identifier, source) {
        return Some(binding);
    }
    let name = node_text(identifier, source);
    let mut current = identifier;
    while let Some(scope) = current.parent() {
        if let Some(binding) = binding_in_scope(scope, name, source) {
            return Some(binding);
        }
        current = scope;
    }
    None
}

/// Binding behind the export `name` of a module, without following
/// `export * from` statements.
pub fn find_export<'t>(root: Node<'t>, name: &str, source: &str) -> Option<Binding<'t>> {
    for statement in named_children(root) {
        if statement.kind() != "export_statement" {
            continue;
        }
        let is_default = has_token(statement, "default");

        if let Some(declaration) = statement.child_by_field_name("declaration") {
            if is_default {
                if name == "default" {
                    let kind = DefinitionKind::of_declaration(declaration.kind())
                        .unwrap_or(DefinitionKind::Export);
                    return Some(Binding::Local {
                        node: statement,
                        kind,
                    });
                }
                continue;
            }
            if let Some((_, node, kind)) = declared_names(declaration, source)
                .into_iter()
                .find(|(declared, _, _)| declared == name)
            {
                return Some(Binding::Local { node, kind });
            }
            continue;
        }

        if is_default || has_token(statement, "=") {
            if name != "default" {
                continue;
            }
            let value = statement
                .child_by_field_name("value")
                .or_else(|| named_children(statement).into_iter().next());
            if let Some(value) = value.filter(|value| value.kind() == "identifier") {
                if let Some(binding) = binding_in_statements(root, node_text(value, source), source) {
                    return Some(binding);
                }
            }
            return Some(Binding::Local {
                node: statement,
                kind: DefinitionKind::Export,
            });
        }

        let module = statement_source(statement, source);
        if let Some(clause) = child_of_kind(statement, "export_clause") {
            for spec in specifiers(clause, "export_specifier", source) {
                let exported = string_value(spec.local, source);
                if exported != name {
                    continue;
                }
                return match &module {
                    Some(specifier) => Some(Binding::Import {
                        statement,
                        specifier: specifier.clone(),
                        imported: ImportedName::from_export_name(&spec.imported),
                    }),
                    None => binding_in_statements(root, &spec.imported, source),
                };
            }
            continue;
        }

        if let (Some(namespace), Some(specifier)) =
            (child_of_kind(statement, "namespace_export"), &module)
        {
            let exported = named_children(namespace)
                .last()
                .map(|node| string_value(*node, source));
            if exported.as_deref() == Some(name) {
                return Some(Binding::Import {
                    statement,
                    specifier: specifier.clone(),
                    imported: ImportedName::Namespace,
                });
            }
        }
    }
    None
}

/// Module specifiers of `export * from "x"` statements.
pub fn star_reexport_sources(root: Node<'_>, source: &str) -> Vec<String> {
    named_children(root)
        .into_iter()
        .filter(|statement| statement.kind() == "export_statement")
        .filter(|statement| has_token(*statement, "*"))
        .filter_map(|statement| statement_source(statement, source))
        .collect()
}

/// Names exported directly by a module. `export * from` sources are reported
/// separately so the caller can expand them.
pub fn direct_export_names(root: Node<'_>, source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for statement in named_children(root) {
        if statement.kind() != "export_statement" {
            continue;
        }
        if has_token(statement, "default") || has_token(statement, "=") {
            names.push("default".to_string());
            continue;
        }
        if let Some(declaration) = statement.child_by_field_name("declaration") {
            names.extend(
                declared_names(declaration, source)
                    .into_iter()
                    .map(|(name, _, _)| name),
            );
        } else if let Some(clause) = child_of_kind(statement, "export_clause") {
            names.extend(
                specifiers(clause, "export_specifier", source)
                    .into_iter()
                    .map(|spec| string_value(spec.local, source)),
            );
        } else if let Some(namespace) = child_of_kind(statement, "namespace_export") {
            names.extend(
                named_children(namespace)
                    .last()
                    .map(|node| string_value(*node, source)),
            );
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_source, SourceLanguage};
    use tree_sitter::Tree;

    fn parse(source: &str) -> Tree {
        parse_source(SourceLanguage::Tsx, source).unwrap()
    }

    fn find_identifier<'t>(node: Node<'t>, source: &str, name: &str, nth: usize) -> Node<'t> {
        let mut found = Vec::new();
        collect_identifiers(node, source, name, &mut found);
        found[nth]
    }

    fn collect_identifiers<'t>(node: Node<'t>, source: &str, name: &str, out: &mut Vec<Node<'t>>) {
        if is_reference_identifier(node) && node_text(node, source) == name {
            out.push(node);
        }
        for child in named_children(node) {
            collect_identifiers(child, source, name, out);
        }
    }

    #[test]
    fn test_import_declarations() {
        let source = r#"import React from "react";
import Default, { a, b as c, default as d } from './mod';
import * as ns from "../ns";
import "./side-effect";
export { e, f as g } from "./reexport";
export * from "./star";
"#;
        let tree = parse(source);
        let imports = import_declarations(tree.root_node(), source);

        let specifiers: Vec<_> = imports.iter().map(|i| i.specifier.as_str()).collect();
        assert_eq!(
            specifiers,
            vec!["react", "./mod", "../ns", "./side-effect", "./reexport", "./star"]
        );

        let module = &imports[1];
        assert_eq!(node_text(module.default.unwrap(), source), "Default");
        let named: Vec<_> = module
            .named
            .iter()
            .map(|spec| (spec.imported.as_str(), node_text(spec.local, source)))
            .collect();
        assert_eq!(named, vec![("a", "a"), ("b", "c"), ("default", "d")]);

        assert_eq!(node_text(imports[2].namespace.unwrap(), source), "ns");
        assert!(imports[3].named.is_empty() && imports[3].default.is_none());
        assert!(imports[4].is_reexport);
        assert_eq!(imports[4].named.len(), 2);
        assert!(imports[5].is_reexport);
    }

    #[test]
    fn test_direct_export_names() {
        let source = r#"export function helperFn() {}
export const a = 1, { b, c: [d] } = obj;
export class Widget {}
export interface Props {}
export type Alias = string;
export enum Color { Red }
const local = 1;
export { local, local as renamed };
export * as tools from "./tools";
export * from "./star";
export default Widget;
"#;
        let tree = parse(source);
        let mut names = direct_export_names(tree.root_node(), source);
        names.sort();
        assert_eq!(
            names,
            vec![
                "Alias", "Color", "Props", "Widget", "a", "b", "d", "default", "helperFn",
                "local", "renamed", "tools"
            ]
        );
        assert_eq!(
            star_reexport_sources(tree.root_node(), source),
            vec!["./star".to_string()]
        );
    }

    #[test]
    fn test_find_binding_prefers_nearest_scope() {
        let source = r#"const value = 1;
function outer(value: number) {
  return value;
}
export const read = () => value;
"#;
        let tree = parse(source);
        let root = tree.root_node();

        let inner_use = find_identifier(root, source, "value", 2);
        match find_binding(inner_use, source) {
            Some(Binding::Local { node, kind }) => {
                assert_eq!(kind, DefinitionKind::Parameter);
                assert_eq!(node.start_position().row, 1);
            }
            other => panic!("unexpected binding: {:?}", other),
        }

        let outer_use = find_identifier(root, source, "value", 3);
        match find_binding(outer_use, source) {
            Some(Binding::Local { node, kind }) => {
                assert_eq!(kind, DefinitionKind::Variable);
                assert_eq!(node.kind(), "variable_declarator");
                assert_eq!(node.start_position().row, 0);
            }
            other => panic!("unexpected binding: {:?}", other),
        }
    }

    #[test]
    fn test_find_binding_for_imports() {
        let source = r#"import Button, { useThing as useIt } from "./ui";
import * as api from "./api";
useIt(Button, api);
"#;
        let tree = parse(source);
        let root = tree.root_node();

        let call = find_identifier(root, source, "useIt", 1);
        match find_binding(call, source) {
            Some(Binding::Import {
                specifier,
                imported,
                ..
            }) => {
                assert_eq!(specifier, "./ui");
                assert_eq!(imported, ImportedName::Named("useThing".to_string()));
            }
            other => panic!("unexpected binding: {:?}", other),
        }

        let button = find_identifier(root, source, "Button", 1);
        assert!(matches!(
            find_binding(button, source),
            Some(Binding::Import {
                imported: ImportedName::Default,
                ..
            })
        ));

        let api = find_identifier(root, source, "api", 1);
        assert!(matches!(
            find_binding(api, source),
            Some(Binding::Import {
                imported: ImportedName::Namespace,
                ..
            })
        ));
    }

    #[test]
    fn test_namespace_member_references() {
        let source = r#"import * as api from "./api";
const user: api.User = api.fetchUser(config.id);
"#;
        let tree = parse(source);
        let root = tree.root_node();

        let call = find_identifier(root, source, "fetchUser", 0);
        let (qualifier, member) = namespace_member(call, source).unwrap();
        assert_eq!(node_text(qualifier, source), "api");
        assert_eq!(member, "fetchUser");

        let user_type = find_identifier(root, source, "User", 0);
        assert_eq!(user_type.parent().unwrap().kind(), "nested_type_identifier");
        assert_eq!(namespace_member(user_type, source).map(|(_, m)| m), Some("User"));

        // `config.id` is visited, only the qualifier decides whether it resolves
        let id = find_identifier(root, source, "id", 0);
        assert_eq!(namespace_member(id, source).map(|(q, _)| node_text(q, source)), Some("config"));
        assert!(namespace_member(find_identifier(root, source, "api", 1), source).is_none());
    }

    #[test]
    fn test_find_export_follows_local_aliases() {
        let source = r#"function impl() {}
export { impl as run };
export { other } from "./other";
export default function main() {}
"#;
        let tree = parse(source);
        let root = tree.root_node();

        match find_export(root, "run", source) {
            Some(Binding::Local { node, kind }) => {
                assert_eq!(kind, DefinitionKind::Function);
                assert_eq!(node.start_position().row, 0);
            }
            other => panic!("unexpected export: {:?}", other),
        }
        assert!(matches!(
            find_export(root, "other", source),
            Some(Binding::Import { ref specifier, .. }) if specifier == "./other"
        ));
        match find_export(root, "default", source) {
            Some(Binding::Local { node, .. }) => {
                assert_eq!(node.kind(), "export_statement");
                assert_eq!(node.start_position().row, 3);
            }
            other => panic!("unexpected export: {:?}", other),
        }
        assert!(find_export(root, "missing", source).is_none());
    }

    #[test]
    fn test_definition_node_widens_to_statement() {
        let source = "export const answer = 42;\nlet x = answer;\n";
        let tree = parse(source);
        let root = tree.root_node();
        let usage = find_identifier(root, source, "answer", 1);
        let Some(Binding::Local { node, .. }) = find_binding(usage, source) else {
            panic!("answer should resolve locally");
        };
        let widened = definition_node(node);
        assert_eq!(widened.kind(), "export_statement");
        assert_eq!(node_text(widened, source), "export const answer = 42;");
    }

    #[test]
    fn test_full_text_includes_leading_trivia() {
        let source = "call(first,   second);\n";
        let tree = parse(source);
        let second = find_identifier(tree.root_node(), source, "second", 0);
        assert_eq!(full_text(second, source), "   second");
    }
}
