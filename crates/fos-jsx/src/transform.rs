//! Module transform
//!
//! Drives one file through the compiler: parse, compile every JSX node in
//! place, then prepend the runtime import and the hoisted declarations.

use crate::ast::{Expr, JsxNode, Piece};
use crate::config::Config;
use crate::error::CompileResult;
use crate::escape::js_string;
use crate::hoist::CompilationUnitState;
use crate::parser::parse_module;

/// Result of compiling one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub code: String,
    /// Distinct hoisted partials
    pub partials: usize,
    /// Templates checked against the HTML parser
    pub validations: usize,
}

/// Compiler for one module
pub struct Compiler<'a> {
    pub(crate) config: &'a Config,
    pub(crate) state: CompilationUnitState,
}

impl<'a> Compiler<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            state: CompilationUnitState::new(),
        }
    }

    /// Compile a parsed module body; the header comes from [`finish`](Self::finish)
    pub fn compile_pieces(&mut self, pieces: &[Piece]) -> CompileResult<String> {
        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Code(code) => out.push_str(code),
                Piece::Jsx(node) => out.push_str(&self.compile_node(node)?),
            }
        }
        Ok(out)
    }

    /// JavaScript for an expression with its JSX compiled
    pub(crate) fn compile_expr(&mut self, expr: &Expr) -> CompileResult<String> {
        self.compile_pieces(&expr.pieces)
    }

    /// JavaScript for one element or fragment
    pub(crate) fn compile_node(&mut self, node: &JsxNode) -> CompileResult<String> {
        let built = self.build_node(node, None)?;
        self.node_code(built)
    }

    /// Prepend the import line and module-scope declarations to `body`
    pub fn finish(self, body: String) -> CompileOutput {
        let partials = self.state.partial_count();
        let validations = self.state.validations();
        let imports: Vec<String> = self
            .state
            .imports()
            .map(|function| format!("{0} as _{0}", function))
            .collect();
        if imports.is_empty() {
            return CompileOutput {
                code: body,
                partials,
                validations,
            };
        }

        let mut code = format!("// fos-jsx ({})\n", self.config.lib);
        code.push_str(&format!(
            "import {{ {} }} from {};\n",
            imports.join(", "),
            js_string(&self.config.import_source())
        ));
        for declaration in self.state.declarations() {
            code.push_str(declaration);
            code.push('\n');
        }
        code.push('\n');
        code.push_str(&body);
        CompileOutput {
            code,
            partials,
            validations,
        }
    }
}

/// Compile the JSX in `source` to plain JavaScript
pub fn compile(source: &str, config: &Config) -> CompileResult<CompileOutput> {
    let module = parse_module(source)?;
    let mut compiler = Compiler::new(config);
    let body = compiler.compile_pieces(&module.pieces)?;
    let output = compiler.finish(body);
    tracing::debug!(
        "compiled module: {} partials, {} validations",
        output.partials,
        output.validations
    );
    Ok(output)
}
