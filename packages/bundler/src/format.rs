//! Final rewrite of generated JavaScript into the requested module format.
//!
//! ES module output only has its relative specifiers fixed up. CommonJS
//! output has every `import`/`export` statement replaced in place by
//! `require` calls and getters on `exports`, and `import()` becomes a
//! promise of `require`. The replacements never add line breaks, so line
//! numbers in a source map stay valid.

use std::collections::HashSet;
use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingIdentifier, BindingPattern, BindingPatternKind, CallExpression, Declaration, ExportDefaultDeclarationKind,
    IdentifierReference, ImportDeclarationSpecifier, ImportExpression, ModuleExportName, Statement,
};
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::scan::{literal_specifier, require_specifier};
use crate::{BuildError, Format};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

/// Rewrites a relative TypeScript specifier to the file the build emits for
/// it: the extension is dropped for CommonJS and becomes `.js` for ESM.
pub fn output_specifier(specifier: &str, format: Format) -> String {
    if !ts::file_system::is_relative_specifier(specifier) || specifier.ends_with(".d.ts") {
        return specifier.to_string();
    }
    for ext in [".tsx", ".ts", ".jsx", ".mts", ".cts"] {
        if let Some(stem) = specifier.strip_suffix(ext) {
            return match format {
                Format::Cjs => stem.to_string(),
                Format::Esm => format!("{}.js", stem),
            };
        }
    }
    specifier.to_string()
}

pub fn finalize(path: &Path, code: &str, format: Format) -> Result<String, BuildError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::mjs()).parse();
    if !ret.errors.is_empty() {
        return Err(BuildError::Parse {
            path: path.to_path_buf(),
            messages: ret.errors.iter().map(|e| e.to_string()).collect(),
        });
    }

    let mut names = NameCollector::default();
    names.visit_program(&ret.program);

    let mut lowering = Lowering::new(format, names.0);
    for stmt in &ret.program.body {
        lowering.lower_statement(stmt);
    }
    lowering.visit_program(&ret.program);
    let hashbang_end = ret.program.hashbang.as_ref().map(|hashbang| hashbang.span.end as usize);
    Ok(lowering.apply(code, hashbang_end))
}

/// Every identifier the module binds or references.
#[derive(Default)]
struct NameCollector(HashSet<String>);

impl<'a> Visit<'a> for NameCollector {
    fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
        self.0.insert(ident.name.to_string());
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        self.0.insert(ident.name.to_string());
    }
}

#[derive(Default)]
struct Lowering {
    format: Format,
    replacements: Vec<(u32, u32, String)>,
    /// `(exported name, expression)` pairs turned into getters.
    exports: Vec<(String, String)>,
    has_module_syntax: bool,
    /// Names already used by the module or handed out by [`Lowering::fresh`].
    taken: HashSet<String>,
    to_default: Option<String>,
    export_star: Option<String>,
    counter: usize,
}

impl Lowering {
    fn new(format: Format, taken: HashSet<String>) -> Self {
        Self {
            format,
            taken,
            ..Self::default()
        }
    }

    fn temp(&mut self, prefix: &str) -> String {
        loop {
            let name = format!("__{}_{}", prefix, self.counter);
            self.counter += 1;
            if self.taken.insert(name.clone()) {
                return name;
            }
        }
    }

    /// `__<base>`, suffixed until it clashes with nothing in the module.
    fn fresh(&mut self, base: &str) -> String {
        let mut name = format!("__{}", base);
        let mut suffix = 0;
        while !self.taken.insert(name.clone()) {
            suffix += 1;
            name = format!("__{}_{}", base, suffix);
        }
        name
    }

    fn to_default(&mut self) -> String {
        if let Some(name) = &self.to_default {
            return name.clone();
        }
        let name = self.fresh("toDefault");
        self.to_default = Some(name.clone());
        name
    }

    fn export_star(&mut self) -> String {
        if let Some(name) = &self.export_star {
            return name.clone();
        }
        let name = self.fresh("exportStar");
        self.export_star = Some(name.clone());
        name
    }

    fn require(&self, specifier: &str) -> String {
        format!("require({})", quote(&output_specifier(specifier, self.format)))
    }

    fn lower_statement(&mut self, stmt: &Statement<'_>) {
        if self.format == Format::Esm {
            self.fix_source(stmt);
            return;
        }

        match stmt {
            Statement::ImportDeclaration(decl) => {
                self.has_module_syntax = true;
                let require = self.require(decl.source.value.as_str());
                let specifiers = decl.specifiers.as_ref().filter(|s| !s.is_empty());
                let Some(specifiers) = specifiers else {
                    self.replace(decl.span.start, decl.span.end, format!("{};", require));
                    return;
                };

                let tmp = self.temp("import");
                let mut out = format!("const {} = {};", tmp, require);
                for specifier in specifiers {
                    match specifier {
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                            let helper = self.to_default();
                            out.push_str(&format!(" const {} = {}({});", s.local.name, helper, tmp));
                        }
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                            out.push_str(&format!(" const {} = {};", s.local.name, tmp));
                        }
                        ImportDeclarationSpecifier::ImportSpecifier(s) => {
                            let access = member(&tmp, s.imported.name().as_str());
                            out.push_str(&format!(" const {} = {};", s.local.name, access));
                        }
                    }
                }
                self.replace(decl.span.start, decl.span.end, out);
            }
            Statement::ExportNamedDeclaration(decl) => {
                self.has_module_syntax = true;
                if let Some(declaration) = &decl.declaration {
                    let mut names = Vec::new();
                    declared_names(declaration, &mut names);
                    for name in names {
                        self.exports.push((name.clone(), name));
                    }
                    self.replace(decl.span.start, declaration.span().start, String::new());
                } else if let Some(source) = &decl.source {
                    let tmp = self.temp("reexport");
                    let require = self.require(source.value.as_str());
                    for specifier in &decl.specifiers {
                        let access = member(&tmp, specifier.local.name().as_str());
                        self.exports.push((export_name(&specifier.exported), access));
                    }
                    self.replace(decl.span.start, decl.span.end, format!("const {} = {};", tmp, require));
                } else {
                    for specifier in &decl.specifiers {
                        self.exports
                            .push((export_name(&specifier.exported), specifier.local.name().to_string()));
                    }
                    self.replace(decl.span.start, decl.span.end, String::new());
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                self.has_module_syntax = true;
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => f.id.as_ref().map(|id| id.name.to_string()),
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => c.id.as_ref().map(|id| id.name.to_string()),
                    _ => None,
                };
                let inner_start = decl.declaration.span().start;
                match named {
                    Some(name) => {
                        self.exports.push(("default".to_string(), name));
                        self.replace(decl.span.start, inner_start, String::new());
                    }
                    None => {
                        let local = self.fresh("default");
                        self.replace(decl.span.start, inner_start, format!("const {} = ", local));
                        self.exports.push(("default".to_string(), local));
                        let is_declaration = matches!(
                            decl.declaration,
                            ExportDefaultDeclarationKind::FunctionDeclaration(_)
                                | ExportDefaultDeclarationKind::ClassDeclaration(_)
                        );
                        if is_declaration {
                            self.replace(decl.span.end, decl.span.end, ";".to_string());
                        }
                    }
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                self.has_module_syntax = true;
                let require = self.require(decl.source.value.as_str());
                match &decl.exported {
                    Some(exported) => {
                        let tmp = self.temp("reexport");
                        self.exports.push((export_name(exported), tmp.clone()));
                        self.replace(decl.span.start, decl.span.end, format!("const {} = {};", tmp, require));
                    }
                    None => {
                        let helper = self.export_star();
                        self.replace(decl.span.start, decl.span.end, format!("{}(exports, {});", helper, require));
                    }
                }
            }
            _ => {}
        }
    }

    fn fix_source(&mut self, stmt: &Statement<'_>) {
        let source = match stmt {
            Statement::ImportDeclaration(decl) => Some(&decl.source),
            Statement::ExportNamedDeclaration(decl) => decl.source.as_ref(),
            Statement::ExportAllDeclaration(decl) => Some(&decl.source),
            _ => None,
        };
        if let Some(source) = source {
            self.fix_specifier(source.value.as_str(), source.span.start, source.span.end);
        }
    }

    fn fix_specifier(&mut self, specifier: &str, start: u32, end: u32) {
        let fixed = output_specifier(specifier, self.format);
        if fixed != specifier {
            self.replace(start, end, quote(&fixed));
        }
    }

    fn replace(&mut self, start: u32, end: u32, text: String) {
        self.replacements.push((start, end, text));
    }

    fn prelude(&self) -> String {
        let mut prelude = String::from("\"use strict\"; Object.defineProperty(exports, \"__esModule\", { value: true });");
        for (name, expr) in &self.exports {
            prelude.push_str(&format!(
                " Object.defineProperty(exports, {}, {{ enumerable: true, get: () => {} }});",
                quote(name),
                expr
            ));
        }
        if let Some(name) = &self.to_default {
            prelude.push_str(&format!(
                " function {}(m) {{ return m && m.__esModule ? m.default : m; }}",
                name
            ));
        }
        if let Some(name) = &self.export_star {
            prelude.push_str(&format!(
                " function {}(t, m) {{ for (const k in m) if (k !== \"default\" && !Object.prototype.hasOwnProperty.call(t, k)) Object.defineProperty(t, k, {{ enumerable: true, get: () => m[k] }}); }}",
                name
            ));
        }
        prelude
    }

    /// The prelude goes first, or on the line after a hashbang.
    fn apply(mut self, code: &str, hashbang_end: Option<usize>) -> String {
        if self.has_module_syntax {
            let prelude = self.prelude();
            let (at, text) = match hashbang_end {
                None => (0, format!("{} ", prelude)),
                Some(end) => match code[end..].find('\n') {
                    Some(offset) => (end + offset + 1, format!("{} ", prelude)),
                    None => (code.len(), format!("\n{}", prelude)),
                },
            };
            self.replace(at as u32, at as u32, text);
        }

        // Apply back to front so earlier offsets stay valid.
        self.replacements.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        let mut result = code.to_string();
        for (start, end, text) in &self.replacements {
            result.replace_range(*start as usize..*end as usize, text);
        }
        result
    }
}

impl<'a> Visit<'a> for Lowering {
    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        let Some((specifier, span)) = literal_specifier(&expr.source) else {
            walk::walk_import_expression(self, expr);
            return;
        };
        match self.format {
            Format::Cjs => {
                let require = self.require(&specifier);
                self.replace(expr.span.start, expr.span.end, format!("Promise.resolve().then(() => {})", require));
            }
            Format::Esm => self.fix_specifier(&specifier, span.start, span.end),
        }
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Some((specifier, span)) = require_specifier(call) {
            self.fix_specifier(&specifier, span.start, span.end);
            return;
        }
        walk::walk_call_expression(self, call);
    }
}

fn declared_names(declaration: &Declaration<'_>, names: &mut Vec<String>) {
    match declaration {
        Declaration::VariableDeclaration(var) => {
            for declarator in &var.declarations {
                binding_names(&declarator.id, names);
            }
        }
        Declaration::FunctionDeclaration(f) => {
            if let Some(id) = &f.id {
                names.push(id.name.to_string());
            }
        }
        Declaration::ClassDeclaration(c) => {
            if let Some(id) = &c.id {
                names.push(id.name.to_string());
            }
        }
        _ => {}
    }
}

fn binding_names(pattern: &BindingPattern<'_>, names: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => names.push(id.name.to_string()),
        BindingPatternKind::ObjectPattern(obj) => {
            for property in &obj.properties {
                binding_names(&property.value, names);
            }
            if let Some(rest) = &obj.rest {
                binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::ArrayPattern(arr) => {
            for element in arr.elements.iter().flatten() {
                binding_names(element, names);
            }
            if let Some(rest) = &arr.rest {
                binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::AssignmentPattern(assign) => binding_names(&assign.left, names),
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    name.name().to_string()
}

fn member(object: &str, property: &str) -> String {
    if IDENTIFIER.is_match(property) {
        format!("{}.{}", object, property)
    } else {
        format!("{}[{}]", object, quote(property))
    }
}

fn quote(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}
