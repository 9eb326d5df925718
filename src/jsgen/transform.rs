//! Conversion functions between types
//!
//! A transform is generated in two steps. Planning walks both type graphs,
//! joins object fields and checks every pair of kinds; rendering then
//! writes the JavaScript for a plan that is known to be valid, so a failed
//! request never produces partial code.
//!
//! Nested objects whose source and target are both named types are
//! converted by a helper function of their own. A generator emits each
//! helper once, however many requests need it, which also keeps the output
//! of recursive types finite.

use super::typedef::field_name;
use super::{compute_mapping, jsify, RenderConfig, TempVars, TypeMapper};
use crate::design::{DataType, Design, Kind};
use crate::error::{Error, Result};
use crate::util::property_access;
use std::collections::{BTreeMap, VecDeque};
use tracing::debug;

/// Source and target type names of a function
type TypePair = (String, String);

/// How a value is carried from source to target
#[derive(Debug)]
enum Plan {
    Assign,
    Object(Vec<FieldPlan>),
    Array(Box<Plan>),
    Hash { key: Box<Plan>, elem: Box<Plan> },
    /// Call of a generated helper function
    Call(String),
}

#[derive(Debug)]
struct FieldPlan {
    source: String,
    target: String,
    plan: Plan,
}

#[derive(Debug)]
struct Function {
    name: String,
    source_type: String,
    target_type: String,
    body: Plan,
}

/// Generates transform functions.
///
/// Temporary variable names and function names are unique across all the
/// functions one generator renders; use one generator per generated module.
pub struct TransformGenerator<'a> {
    mapper: TypeMapper<'a>,
    vars: TempVars,
    /// Function converting each type pair, reused by later requests
    names: BTreeMap<TypePair, String>,
    /// Type pair of every function emitted so far
    emitted: BTreeMap<String, TypePair>,
}

impl<'a> TransformGenerator<'a> {
    pub fn new(design: &'a Design, config: &'a RenderConfig) -> Self {
        Self {
            mapper: TypeMapper::new(design, config),
            vars: TempVars::new(),
            names: BTreeMap::new(),
            emitted: BTreeMap::new(),
        }
    }

    pub fn temp_vars(&self) -> &TempVars {
        &self.vars
    }

    /// Code of the function converting `source` values into `target`
    /// values, followed by the helper functions it calls that this
    /// generator has not emitted yet.
    ///
    /// The function is named `name`, or `<source>To<Target>` by default.
    /// The result is empty when that function was already emitted.
    ///
    /// # Errors
    /// Besides the structural errors, [`Error::DuplicateFunctionName`] when
    /// a function name is already taken by another pair of types.
    pub fn transform(
        &mut self,
        source: &DataType,
        target: &DataType,
        name: Option<&str>,
    ) -> Result<String> {
        let mut planner = Planner {
            mapper: self.mapper,
            design: self.mapper.design(),
            names: self.names.clone(),
            emitted: self.emitted.clone(),
            pending: VecDeque::new(),
        };
        let functions = planner.plan(source, target, name)?;
        self.names = planner.names;
        self.emitted = planner.emitted;
        debug!(
            source = %source.name(),
            target = %target.name(),
            functions = functions.len(),
            "planned transform"
        );

        let mut out = String::new();
        for (i, function) in functions.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&self.render_function(function));
        }
        Ok(out)
    }

    fn render_function(&mut self, function: &Function) -> String {
        let pad = self.mapper.indent(1);
        let mut body = String::new();
        self.render_value(&function.body, "source", "target", 1, &mut body);
        format!(
            "export function {}(source: {}): {} {{\n{pad}let target\n{body}{pad}return target\n}}\n",
            function.name, function.source_type, function.target_type
        )
    }

    /// Render a nested value; containers are only built when the source
    /// value is present
    fn render(&mut self, plan: &Plan, src: &str, dst: &str, depth: usize, out: &mut String) {
        let pad = self.mapper.indent(depth);
        match plan {
            Plan::Assign => out.push_str(&format!("{pad}{dst} = {src}\n")),
            Plan::Call(function) => out.push_str(&format!(
                "{pad}{dst} = {src} == null ? {src} : {function}({src})\n"
            )),
            Plan::Object(_) | Plan::Array(_) | Plan::Hash { .. } => {
                let inner = self.mapper.indent(depth + 1);
                out.push_str(&format!(
                    "{pad}if ({src} == null) {{\n{inner}{dst} = {src}\n{pad}}} else {{\n"
                ));
                self.render_value(plan, src, dst, depth + 1, out);
                out.push_str(&format!("{pad}}}\n"));
            }
        }
    }

    fn render_value(&mut self, plan: &Plan, src: &str, dst: &str, depth: usize, out: &mut String) {
        let pad = self.mapper.indent(depth);
        match plan {
            Plan::Object(fields) => {
                out.push_str(&format!("{pad}{dst} = {{}}\n"));
                for field in fields {
                    self.render(
                        &field.plan,
                        &property_access(src, &field.source),
                        &property_access(dst, &field.target),
                        depth,
                        out,
                    );
                }
            }
            Plan::Array(elem) => {
                let i = self.vars.fresh();
                out.push_str(&format!(
                    "{pad}{dst} = new Array({src}.length)\n\
                     {pad}for (let {i} = 0; {i} < {src}.length; {i}++) {{\n"
                ));
                self.render(elem, &format!("{src}[{i}]"), &format!("{dst}[{i}]"), depth + 1, out);
                out.push_str(&format!("{pad}}}\n"));
            }
            Plan::Hash { key, elem } => {
                let k = self.vars.fresh();
                let tk = self.vars.fresh();
                let tv = self.vars.fresh();
                let inner = self.mapper.indent(depth + 1);
                out.push_str(&format!(
                    "{pad}{dst} = {{}}\n{pad}for (const {k} of Object.keys({src})) {{\n{inner}let {tk}\n"
                ));
                self.render(key, &k, &tk, depth + 1, out);
                out.push_str(&format!("{inner}let {tv}\n"));
                self.render(elem, &format!("{src}[{k}]"), &tv, depth + 1, out);
                out.push_str(&format!("{inner}{dst}[{tk}] = {tv}\n{pad}}}\n"));
            }
            Plan::Assign | Plan::Call(_) => self.render(plan, src, dst, depth, out),
        }
    }
}

/// Default name of the function converting `source` into `target`
fn function_name(mapper: &TypeMapper<'_>, source: &DataType, target: &DataType) -> Result<String> {
    let part = |t: &DataType, upper: bool| {
        if t.is_named() {
            mapper.type_name(t, &[], 0, !upper)
        } else {
            jsify(&t.name(), upper)
        }
    };
    Ok(format!("{}To{}", part(source, false)?, part(target, true)?))
}

/// Plans one transform request. The name tables are copies of the
/// generator's and only replace them once planning succeeded.
struct Planner<'a> {
    mapper: TypeMapper<'a>,
    design: &'a Design,
    names: BTreeMap<TypePair, String>,
    emitted: BTreeMap<String, TypePair>,
    pending: VecDeque<(DataType, DataType, String)>,
}

impl Planner<'_> {
    fn plan(&mut self, source: &DataType, target: &DataType, name: Option<&str>) -> Result<Vec<Function>> {
        let pair = self.pair(source, target)?;
        let name = match (name, self.names.get(&pair)) {
            (Some(name), _) => name.to_string(),
            (None, Some(known)) => known.clone(),
            (None, None) => function_name(&self.mapper, source, target)?,
        };
        if self.emitted.get(&name) == Some(&pair) {
            debug!(function = %name, "transform already generated");
            return Ok(Vec::new());
        }
        self.claim(&name, &pair)?;
        self.names.entry(pair).or_insert_with(|| name.clone());
        self.pending.push_back((source.clone(), target.clone(), name));

        let mut functions = Vec::new();
        while let Some((s, t, name)) = self.pending.pop_front() {
            let body = self.plan_root(&s, &t)?;
            functions.push(Function {
                name,
                source_type: self
                    .mapper
                    .type_name(&s, &self.design.required_of(&s)?, 0, false)?,
                target_type: self
                    .mapper
                    .type_name(&t, &self.design.required_of(&t)?, 0, false)?,
                body,
            });
        }
        Ok(functions)
    }

    fn pair(&self, source: &DataType, target: &DataType) -> Result<TypePair> {
        Ok((
            self.mapper.type_name(source, &[], 0, false)?,
            self.mapper.type_name(target, &[], 0, false)?,
        ))
    }

    /// Reserve a function name for a pair of types
    fn claim(&mut self, name: &str, pair: &TypePair) -> Result<()> {
        if let Some(first) = self.emitted.get(name) {
            if first != pair {
                return Err(Error::DuplicateFunctionName {
                    name: name.to_string(),
                    first: format!("{} to {}", first.0, first.1),
                    second: format!("{} to {}", pair.0, pair.1),
                });
            }
        }
        self.emitted.insert(name.to_string(), pair.clone());
        Ok(())
    }

    fn plan_root(&mut self, source: &DataType, target: &DataType) -> Result<Plan> {
        let (sk, tk) = (self.design.kind(source)?, self.design.kind(target)?);
        if sk != tk || sk.is_primitive() {
            return Err(Error::IncompatibleShape {
                source_name: source.name(),
                source_kind: sk.to_string(),
                target_name: target.name(),
                target_kind: tk.to_string(),
            });
        }
        self.plan_value(source, target, "source", "target")
    }

    /// Plan for two types of the same kind
    fn plan_value(&mut self, source: &DataType, target: &DataType, sctx: &str, tctx: &str) -> Result<Plan> {
        let (source_shape, target_shape) = (self.design.viewed(source)?, self.design.viewed(target)?);
        match (&source_shape, &target_shape) {
            (DataType::Object(sf), DataType::Object(tf)) => {
                let mapping = compute_mapping(sf, tf, sctx, tctx)?;
                let mut pairs = Vec::with_capacity(mapping.len());
                for (s, t) in &mapping {
                    let (sa, ta) = (&sf[s], &tf[t]);
                    let (sfield, tfield) = (format!("{}.{}", sctx, s), format!("{}.{}", tctx, t));
                    if self.design.kind(&sa.data_type)? != self.design.kind(&ta.data_type)? {
                        return Err(Error::IncompatibleFieldType {
                            source_ctx: sfield,
                            source_type: sa.data_type.name(),
                            target_ctx: tfield,
                            target_type: ta.data_type.name(),
                        });
                    }
                    pairs.push((jsify(field_name(sa, s), false)?, s, t, sfield, tfield));
                }
                pairs.sort();

                let mut fields = Vec::with_capacity(pairs.len());
                for (_, s, t, sfield, tfield) in pairs {
                    let (sa, ta) = (&sf[s], &tf[t]);
                    fields.push(FieldPlan {
                        source: field_name(sa, s).to_string(),
                        target: field_name(ta, t).to_string(),
                        plan: self.plan_nested(&sa.data_type, &ta.data_type, &sfield, &tfield)?,
                    });
                }
                Ok(Plan::Object(fields))
            }
            (DataType::Array(se), DataType::Array(te)) => {
                let (sk, tk) = (self.design.kind(&se.data_type)?, self.design.kind(&te.data_type)?);
                if sk != tk {
                    return Err(Error::IncompatibleElementType {
                        source_ctx: sctx.to_string(),
                        source_type: se.data_type.name(),
                        target_ctx: tctx.to_string(),
                        target_type: te.data_type.name(),
                    });
                }
                let elem = self.plan_nested(
                    &se.data_type,
                    &te.data_type,
                    &format!("{}[]", sctx),
                    &format!("{}[]", tctx),
                )?;
                Ok(Plan::Array(Box::new(elem)))
            }
            (DataType::Hash(sh), DataType::Hash(th)) => {
                if self.design.kind(&sh.key.data_type)? != self.design.kind(&th.key.data_type)? {
                    return Err(Error::IncompatibleKeyType {
                        source_ctx: sctx.to_string(),
                        source_type: sh.key.data_type.name(),
                        target_ctx: tctx.to_string(),
                        target_type: th.key.data_type.name(),
                    });
                }
                if self.design.kind(&sh.elem.data_type)? != self.design.kind(&th.elem.data_type)? {
                    return Err(Error::IncompatibleElementType {
                        source_ctx: sctx.to_string(),
                        source_type: sh.elem.data_type.name(),
                        target_ctx: tctx.to_string(),
                        target_type: th.elem.data_type.name(),
                    });
                }
                let key = self.plan_nested(
                    &sh.key.data_type,
                    &th.key.data_type,
                    &format!("{}{{key}}", sctx),
                    &format!("{}{{key}}", tctx),
                )?;
                let elem = self.plan_nested(
                    &sh.elem.data_type,
                    &th.elem.data_type,
                    &format!("{}{{elem}}", sctx),
                    &format!("{}{{elem}}", tctx),
                )?;
                Ok(Plan::Hash {
                    key: Box::new(key),
                    elem: Box::new(elem),
                })
            }
            _ => Ok(Plan::Assign),
        }
    }

    /// Plan for a nested value whose kind was checked by the caller
    fn plan_nested(&mut self, source: &DataType, target: &DataType, sctx: &str, tctx: &str) -> Result<Plan> {
        if source.is_named() && target.is_named() && self.design.kind(source)? == Kind::Object {
            return Ok(Plan::Call(self.helper(source, target)?));
        }
        self.plan_value(source, target, sctx, tctx)
    }

    /// Name of the helper function for a pair of named types, queueing it
    /// for planning the first time the pair is seen
    fn helper(&mut self, source: &DataType, target: &DataType) -> Result<String> {
        let pair = self.pair(source, target)?;
        if let Some(name) = self.names.get(&pair) {
            return Ok(name.clone());
        }
        let name = function_name(&self.mapper, source, target)?;
        self.claim(&name, &pair)?;
        self.names.insert(pair, name.clone());
        self.pending
            .push_back((source.clone(), target.clone(), name.clone()));
        Ok(name)
    }
}
