use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression, ImportDeclaration, ImportExpression,
    TSImportEqualsDeclaration, TSModuleReference,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};

use crate::{BuildError, ImportKind};

/// Import specifiers of a module, in source order.
///
/// Covers static imports and re-exports, `import()` and `require()` calls
/// with a literal argument, and `import x = require()`. Type-only imports
/// and re-exports are skipped.
pub fn scan_imports(path: &Path, source: &str, source_type: SourceType) -> Result<Vec<(String, ImportKind)>, BuildError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        return Err(BuildError::Parse {
            path: path.to_path_buf(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let mut collector = ImportCollector::default();
    collector.visit_program(&ret.program);
    Ok(collector.imports)
}

/// The text and span of a string literal or a template literal without
/// substitutions.
pub(crate) fn literal_specifier(expr: &Expression<'_>) -> Option<(String, Span)> {
    match expr {
        Expression::StringLiteral(lit) => Some((lit.value.to_string(), lit.span)),
        Expression::TemplateLiteral(tpl) if tpl.expressions.is_empty() => tpl
            .quasis
            .first()
            .and_then(|quasi| quasi.value.cooked.as_ref())
            .map(|cooked| (cooked.to_string(), tpl.span)),
        _ => None,
    }
}

/// The specifier of a `require('x')` call.
pub(crate) fn require_specifier(call: &CallExpression<'_>) -> Option<(String, Span)> {
    let Expression::Identifier(callee) = &call.callee else {
        return None;
    };
    if callee.name.as_str() != "require" || call.arguments.len() != 1 {
        return None;
    }
    call.arguments[0].as_expression().and_then(literal_specifier)
}

#[derive(Default)]
struct ImportCollector {
    imports: Vec<(String, ImportKind)>,
}

impl ImportCollector {
    fn push(&mut self, specifier: String, kind: ImportKind) {
        let entry = (specifier, kind);
        if !self.imports.contains(&entry) {
            self.imports.push(entry);
        }
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        if decl.import_kind.is_value() {
            self.push(decl.source.value.to_string(), ImportKind::ImportStatement);
        }
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if decl.export_kind.is_value() {
            if let Some(source) = &decl.source {
                self.push(source.value.to_string(), ImportKind::ReExport);
            }
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        if decl.export_kind.is_value() {
            self.push(decl.source.value.to_string(), ImportKind::ReExport);
        }
    }

    fn visit_ts_import_equals_declaration(&mut self, decl: &TSImportEqualsDeclaration<'a>) {
        if !decl.import_kind.is_value() {
            return;
        }
        if let TSModuleReference::ExternalModuleReference(reference) = &decl.module_reference {
            self.push(reference.expression.value.to_string(), ImportKind::ImportRequire);
        }
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Some((specifier, _)) = literal_specifier(&expr.source) {
            self.push(specifier, ImportKind::DynamicImport);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some((specifier, _)) = require_specifier(call) {
            self.push(specifier, ImportKind::RequireCall);
        }
        walk::walk_call_expression(self, call);
    }
}
