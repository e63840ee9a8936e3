//! Interpreter for codec programs.
//!
//! Executes the procedures the generator emitted: `encode` walks a
//! [`Value`] and produces a [`WireValue`]; `decode` walks a [`WireValue`]
//! and reconstructs a [`Value`]. Delegated `call` instructions resolve
//! through the program's procedure table, which is how the generator's
//! call graph executes without any inline expansion at runtime either.

use std::cell::Cell;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use weft_schema::TimestampFormat;

use crate::{Node, Proc, Program, RuntimeError, Value, WireValue};

type Env = FxHashMap<String, Value>;
type ExecResult<T> = Result<T, RuntimeError>;

/// External supplier of idempotency tokens for `token.default`.
pub trait TokenSource {
    fn next_token(&self) -> String;
}

/// Always yields the same token. Useful in tests.
pub struct FixedTokens(pub String);

impl TokenSource for FixedTokens {
    fn next_token(&self) -> String {
        self.0.clone()
    }
}

/// Yields `token-0`, `token-1`, ...
#[derive(Default)]
pub struct SequenceTokens(Cell<u64>);

impl TokenSource for SequenceTokens {
    fn next_token(&self) -> String {
        let n = self.0.get();
        self.0.set(n + 1);
        format!("token-{n}")
    }
}

/// Executable view over a parsed program.
pub struct Codec<'a> {
    program: &'a Program,
    tokens: &'a dyn TokenSource,
}

impl<'a> Codec<'a> {
    pub fn new(program: &'a Program, tokens: &'a dyn TokenSource) -> Self {
        Self { program, tokens }
    }

    /// Run an encode procedure over a runtime value.
    pub fn encode(&self, proc_name: &str, input: &Value) -> ExecResult<WireValue> {
        let proc = self.lookup(proc_name)?;
        let mut env = Env::default();
        env.insert(proc.param.clone(), input.clone());
        self.produce(&proc.body, &mut env)?.ok_or_else(|| {
            RuntimeError::mismatch(proc_name, "procedure produced no wire value")
        })
    }

    /// Run a decode procedure over a wire value.
    pub fn decode(&self, proc_name: &str, wire: &WireValue) -> ExecResult<Value> {
        let proc = self.lookup(proc_name)?;
        self.read(&proc.body, wire)?.ok_or_else(|| {
            RuntimeError::mismatch(proc_name, "procedure produced no runtime value")
        })
    }

    fn lookup(&self, name: &str) -> ExecResult<&'a Proc> {
        self.program
            .proc(name)
            .ok_or_else(|| RuntimeError::UnknownProcedure(name.to_owned()))
    }

    // Encode side

    /// Evaluate a producer block: `let`/`token.default` preludes followed by
    /// exactly one producing construct.
    fn produce(&self, nodes: &[Node], env: &mut Env) -> ExecResult<Option<WireValue>> {
        let mut result = None;
        for node in nodes {
            let produced = match node.op() {
                "let" => {
                    self.bind_let(node, env)?;
                    None
                }
                "token.default" => {
                    self.apply_token_default(node, env)?;
                    None
                }
                "bool.put" | "int.put" | "float.put" | "str.put" | "blob.put" | "enum.put"
                | "doc.put" => Some(put_leaf(node.op(), var(env, req_arg(node, 1)?)?)?),
                "time.put" => {
                    let value = var(env, req_arg(node, 1)?)?;
                    let format = time_format(node, 2)?;
                    Some(put_time(value, format)?)
                }
                "call" => {
                    let target = req_arg(node, 1)?;
                    let value = var(env, req_arg(node, 2)?)?.clone();
                    Some(self.encode(target, &value)?)
                }
                "obj.put" => {
                    let mut fields = IndexMap::new();
                    self.produce_object(&node.children, env, &mut fields)?;
                    Some(WireValue::Object(fields))
                }
                "arr.put" => Some(self.produce_array(node, env)?),
                "map.put" => Some(self.produce_map(node, env)?),
                "union.put" => Some(self.produce_union(node, env)?),
                other => return Err(RuntimeError::UnknownInstruction(other.to_owned())),
            };
            if let Some(wire) = produced {
                if result.is_some() {
                    return Err(RuntimeError::mismatch(node.op(), "second producer in block"));
                }
                result = Some(wire);
            }
        }
        Ok(result)
    }

    /// Evaluate statements in an object-construction scope.
    fn produce_object(
        &self,
        nodes: &[Node],
        env: &mut Env,
        fields: &mut IndexMap<String, WireValue>,
    ) -> ExecResult<()> {
        for node in nodes {
            match node.op() {
                "let" => self.bind_let(node, env)?,
                "token.default" => self.apply_token_default(node, env)?,
                "ifset" => {
                    let name = req_arg(node, 1)?;
                    if !var(env, name)?.is_null() {
                        self.produce_object(&node.children, env, fields)?;
                    }
                }
                "field" => {
                    let wire_name = req_arg(node, 1)?.to_owned();
                    if let Some(wire) = self.produce(&node.children, env)? {
                        fields.insert(wire_name, wire);
                    }
                }
                other => return Err(RuntimeError::UnknownInstruction(other.to_owned())),
            }
        }
        Ok(())
    }

    fn produce_array(&self, node: &Node, env: &mut Env) -> ExecResult<WireValue> {
        let for_node = single_child(node, "for")?;
        let loop_var = req_arg(for_node, 1)?.to_owned();
        let source = req_arg(for_node, 3)?;
        let Value::List(items) = var(env, source)?.clone() else {
            return Err(RuntimeError::mismatch(
                "arr.put",
                format!("`{source}` is not a list"),
            ));
        };
        let elem_node = single_child(for_node, "elem")?;
        let sparse = req_arg(elem_node, 1)? == "sparse";
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            env.insert(loop_var.clone(), item);
            let current = var(env, &loop_var)?;
            if current.is_null() {
                // Sparse containers keep the position as a null marker;
                // dense containers drop the element.
                if sparse {
                    out.push(WireValue::Null);
                }
                continue;
            }
            let Some(wire) = self.produce(&elem_node.children, env)? else {
                return Err(RuntimeError::mismatch("elem", "element produced no value"));
            };
            out.push(wire);
        }
        Ok(WireValue::Array(out))
    }

    fn produce_map(&self, node: &Node, env: &mut Env) -> ExecResult<WireValue> {
        let for_node = single_child(node, "for")?;
        let key_var = req_arg(for_node, 1)?.to_owned();
        let value_var = req_arg(for_node, 2)?.to_owned();
        let source = req_arg(for_node, 4)?;
        let Value::Map(entries) = var(env, source)?.clone() else {
            return Err(RuntimeError::mismatch(
                "map.put",
                format!("`{source}` is not a map"),
            ));
        };
        let entry_node = single_child(for_node, "entry")?;
        let sparse = req_arg(entry_node, 1)? == "sparse";
        let mut out = IndexMap::new();
        for (key, value) in entries {
            env.insert(key_var.clone(), Value::Str(key.clone()));
            env.insert(value_var.clone(), value);
            if var(env, &value_var)?.is_null() {
                // Sparse maps keep the key with a null placeholder; dense
                // maps drop the whole entry and move on.
                if sparse {
                    out.insert(key, WireValue::Null);
                }
                continue;
            }
            let Some(wire) = self.produce(&entry_node.children, env)? else {
                return Err(RuntimeError::mismatch("entry", "entry produced no value"));
            };
            out.insert(key, wire);
        }
        Ok(WireValue::Object(out))
    }

    fn produce_union(&self, node: &Node, env: &mut Env) -> ExecResult<WireValue> {
        let source = req_arg(node, 1)?;
        let Value::Union { variant, value, .. } = var(env, source)?.clone() else {
            return Err(RuntimeError::mismatch(
                "union.put",
                format!("`{source}` is not a union"),
            ));
        };
        for case in &node.children {
            if case.op() != "case" {
                return Err(RuntimeError::UnknownInstruction(case.op().to_owned()));
            }
            if req_arg(case, 1)? == variant {
                let wire_name = req_arg(case, 2)?.to_owned();
                let payload_var = req_arg(case, 3)?.to_owned();
                env.insert(payload_var, *value);
                let Some(wire) = self.produce(&case.children, env)? else {
                    return Err(RuntimeError::mismatch("case", "case produced no value"));
                };
                let mut fields = IndexMap::new();
                fields.insert(wire_name, wire);
                return Ok(WireValue::Object(fields));
            }
        }
        Err(RuntimeError::mismatch(
            "union.put",
            format!("value carries variant `{variant}` outside the schema"),
        ))
    }

    fn bind_let(&self, node: &Node, env: &mut Env) -> ExecResult<()> {
        // let <var> = <path>
        let target = req_arg(node, 1)?.to_owned();
        let path = req_arg(node, 3)?;
        let value = eval_path(path, env)?;
        env.insert(target, value);
        Ok(())
    }

    fn apply_token_default(&self, node: &Node, env: &mut Env) -> ExecResult<()> {
        let name = req_arg(node, 1)?;
        if var(env, name)?.is_null() {
            env.insert(name.to_owned(), Value::Str(self.tokens.next_token()));
        }
        Ok(())
    }

    // Decode side

    /// Evaluate a reader block: exactly one reading construct over the
    /// current wire value.
    fn read(&self, nodes: &[Node], wire: &WireValue) -> ExecResult<Option<Value>> {
        let mut result = None;
        for node in nodes {
            let read = match node.op() {
                "bool.take" | "int.take" | "float.take" | "str.take" | "blob.take"
                | "doc.take" => Some(take_leaf(node.op(), wire)?),
                "time.take" => Some(take_time(wire, time_format(node, 1)?)?),
                "enum.take" => Some(take_enum(&node.children, wire)?),
                "call" => Some(self.decode(req_arg(node, 1)?, wire)?),
                "obj.take" => Some(self.read_object(node, wire)?),
                "arr.take" => Some(self.read_array(node, wire)?),
                "map.take" => Some(self.read_map(node, wire)?),
                "union.take" => Some(self.read_union(node, wire)?),
                other => return Err(RuntimeError::UnknownInstruction(other.to_owned())),
            };
            if let Some(value) = read {
                if result.is_some() {
                    return Err(RuntimeError::mismatch(node.op(), "second reader in block"));
                }
                result = Some(value);
            }
        }
        Ok(result)
    }

    fn read_object(&self, node: &Node, wire: &WireValue) -> ExecResult<Value> {
        let shape = req_arg(node, 1)?.to_owned();
        let WireValue::Object(entries) = wire else {
            return Err(RuntimeError::mismatch(
                "obj.take",
                format!("expected object, found {}", wire.kind_name()),
            ));
        };
        let has_default_skip = node
            .children
            .iter()
            .any(|child| child.op() == "default" && child.arg(1) == Some("skip"));
        let mut fields = IndexMap::new();
        for (key, field_wire) in entries {
            let matched = node
                .children
                .iter()
                .find(|child| child.op() == "field" && child.arg(1) == Some(key.as_str()));
            match matched {
                Some(field_node) => {
                    // A null field on the wire reads as absent.
                    if field_wire.is_null() {
                        continue;
                    }
                    let member = req_arg(field_node, 2)?.to_owned();
                    let Some(value) = self.read(&field_node.children, field_wire)? else {
                        return Err(RuntimeError::mismatch("field", "field read no value"));
                    };
                    fields.insert(member, value);
                }
                // Unknown wire field: skipped, not an error.
                None if has_default_skip => continue,
                None => {
                    return Err(RuntimeError::mismatch(
                        "obj.take",
                        format!("unknown field `{key}` and no default branch"),
                    ))
                }
            }
        }
        Ok(Value::Struct { shape, fields })
    }

    fn read_array(&self, node: &Node, wire: &WireValue) -> ExecResult<Value> {
        let WireValue::Array(items) = wire else {
            return Err(RuntimeError::mismatch(
                "arr.take",
                format!("expected array, found {}", wire.kind_name()),
            ));
        };
        let each = single_child(node, "each")?;
        let sparse = req_arg(each, 1)? == "sparse";
        // One fresh accumulator per call.
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if item.is_null() {
                // Sparse: reinsert the null placeholder. Dense: drop the
                // element and continue with the next position.
                if sparse {
                    out.push(Value::Null);
                }
                continue;
            }
            let Some(value) = self.read(&each.children, item)? else {
                return Err(RuntimeError::mismatch("each", "element read no value"));
            };
            out.push(value);
        }
        Ok(Value::List(out))
    }

    fn read_map(&self, node: &Node, wire: &WireValue) -> ExecResult<Value> {
        let WireValue::Object(entries) = wire else {
            return Err(RuntimeError::mismatch(
                "map.take",
                format!("expected object, found {}", wire.kind_name()),
            ));
        };
        let each = single_child(node, "each")?;
        let sparse = req_arg(each, 1)? == "sparse";
        let mut out = IndexMap::new();
        for (key, item) in entries {
            if item.is_null() {
                // Sparse: keep the key with a null value. Dense: drop the
                // whole entry.
                if sparse {
                    out.insert(key.clone(), Value::Null);
                }
                continue;
            }
            let Some(value) = self.read(&each.children, item)? else {
                return Err(RuntimeError::mismatch("each", "entry read no value"));
            };
            out.insert(key.clone(), value);
        }
        Ok(Value::Map(out))
    }

    fn read_union(&self, node: &Node, wire: &WireValue) -> ExecResult<Value> {
        let shape = req_arg(node, 1)?.to_owned();
        let WireValue::Object(entries) = wire else {
            return Err(RuntimeError::mismatch(
                "union.take",
                format!("expected object, found {}", wire.kind_name()),
            ));
        };
        let Some((tag, payload)) = entries.iter().next() else {
            return Err(RuntimeError::mismatch("union.take", "empty union object"));
        };
        let matched = node
            .children
            .iter()
            .find(|child| child.op() == "case" && child.arg(1) == Some(tag.as_str()));
        let Some(case) = matched else {
            return Err(RuntimeError::UnknownUnionVariant {
                shape,
                tag: tag.clone(),
            });
        };
        let variant = req_arg(case, 2)?.to_owned();
        let Some(value) = self.read(&case.children, payload)? else {
            return Err(RuntimeError::mismatch("case", "case read no value"));
        };
        Ok(Value::Union {
            shape,
            variant,
            value: Box::new(value),
        })
    }
}

// Leaf transforms

fn put_leaf(op: &str, value: &Value) -> ExecResult<WireValue> {
    let mismatch =
        || RuntimeError::mismatch(op, format!("cannot encode {} here", value.kind_name()));
    match (op, value) {
        ("bool.put", Value::Bool(b)) => Ok(WireValue::Bool(*b)),
        ("int.put", Value::Int(i)) => Ok(WireValue::Int(*i)),
        ("float.put", Value::Float(f)) => Ok(WireValue::Float(*f)),
        #[allow(clippy::cast_precision_loss)]
        ("float.put", Value::Int(i)) => Ok(WireValue::Float(*i as f64)),
        ("str.put", Value::Str(s)) => Ok(WireValue::Str(s.clone())),
        ("blob.put", Value::Bytes(bytes)) => Ok(WireValue::Str(BASE64.encode(bytes))),
        ("enum.put", Value::Enum { raw, .. }) => Ok(WireValue::Str(raw.clone())),
        ("doc.put", Value::Document(wire)) => Ok(wire.clone()),
        _ => Err(mismatch()),
    }
}

fn take_leaf(op: &str, wire: &WireValue) -> ExecResult<Value> {
    let mismatch =
        || RuntimeError::mismatch(op, format!("cannot decode {} here", wire.kind_name()));
    match (op, wire) {
        ("bool.take", WireValue::Bool(b)) => Ok(Value::Bool(*b)),
        ("int.take", WireValue::Int(i)) => Ok(Value::Int(*i)),
        ("float.take", WireValue::Float(f)) => Ok(Value::Float(*f)),
        #[allow(clippy::cast_precision_loss)]
        ("float.take", WireValue::Int(i)) => Ok(Value::Float(*i as f64)),
        ("str.take", WireValue::Str(s)) => Ok(Value::Str(s.clone())),
        ("blob.take", WireValue::Str(s)) => BASE64
            .decode(s)
            .map(Value::Bytes)
            .map_err(|err| RuntimeError::mismatch(op, err.to_string())),
        ("doc.take", wire) => Ok(Value::Document(wire.clone())),
        _ => Err(mismatch()),
    }
}

fn put_time(value: &Value, format: TimestampFormat) -> ExecResult<WireValue> {
    let Value::Timestamp(at) = value else {
        return Err(RuntimeError::mismatch(
            "time.put",
            format!("cannot encode {} as a timestamp", value.kind_name()),
        ));
    };
    Ok(match format {
        TimestampFormat::EpochSeconds => WireValue::Int(at.timestamp()),
        TimestampFormat::DateTime => {
            WireValue::Str(at.to_rfc3339_opts(SecondsFormat::Secs, true))
        }
        TimestampFormat::HttpDate => WireValue::Str(at.to_rfc2822()),
    })
}

fn take_time(wire: &WireValue, format: TimestampFormat) -> ExecResult<Value> {
    let mismatch = |detail: String| RuntimeError::mismatch("time.take", detail);
    let at: DateTime<Utc> = match (format, wire) {
        (TimestampFormat::EpochSeconds, WireValue::Int(secs)) => {
            DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| mismatch(format!("epoch seconds {secs} out of range")))?
        }
        (TimestampFormat::DateTime, WireValue::Str(s)) => DateTime::parse_from_rfc3339(s)
            .map_err(|err| mismatch(err.to_string()))?
            .with_timezone(&Utc),
        (TimestampFormat::HttpDate, WireValue::Str(s)) => DateTime::parse_from_rfc2822(s)
            .map_err(|err| mismatch(err.to_string()))?
            .with_timezone(&Utc),
        (_, other) => {
            return Err(mismatch(format!(
                "wire kind {} does not carry a {format} timestamp",
                other.kind_name()
            )))
        }
    };
    Ok(Value::Timestamp(at))
}

fn take_enum(variants: &[Node], wire: &WireValue) -> ExecResult<Value> {
    let WireValue::Str(raw) = wire else {
        return Err(RuntimeError::mismatch(
            "enum.take",
            format!("expected string, found {}", wire.kind_name()),
        ));
    };
    for variant in variants {
        if variant.op() != "variant" {
            return Err(RuntimeError::UnknownInstruction(variant.op().to_owned()));
        }
        if variant.arg(1) == Some(raw.as_str()) {
            let name = req_arg(variant, 2)?.to_owned();
            return Ok(Value::Enum {
                variant: Some(name),
                raw: raw.clone(),
            });
        }
    }
    // Unrecognized catch-all: keep the raw string, not an error.
    Ok(Value::Enum {
        variant: None,
        raw: raw.clone(),
    })
}

// Helpers

fn var<'e>(env: &'e Env, name: &str) -> ExecResult<&'e Value> {
    env.get(name)
        .ok_or_else(|| RuntimeError::MissingVariable(name.to_owned()))
}

fn eval_path(path: &str, env: &Env) -> ExecResult<Value> {
    match path.split_once('.') {
        None => Ok(var(env, path)?.clone()),
        Some((base, field)) => match var(env, base)? {
            Value::Struct { fields, .. } => {
                Ok(fields.get(field).cloned().unwrap_or(Value::Null))
            }
            other => Err(RuntimeError::mismatch(
                "let",
                format!("`{base}` is {}, not a structure", other.kind_name()),
            )),
        },
    }
}

fn req_arg<'n>(node: &'n Node, index: usize) -> ExecResult<&'n str> {
    node.arg(index).ok_or_else(|| {
        RuntimeError::mismatch(node.op(), format!("missing argument {index}"))
    })
}

fn single_child<'n>(node: &'n Node, expected: &str) -> ExecResult<&'n Node> {
    match node.children.as_slice() {
        [child] if child.op() == expected => Ok(child),
        _ => Err(RuntimeError::mismatch(
            node.op(),
            format!("expected a single `{expected}` block"),
        )),
    }
}

fn time_format(node: &Node, index: usize) -> ExecResult<TimestampFormat> {
    let token = req_arg(node, index)?;
    TimestampFormat::from_token(token)
        .ok_or_else(|| RuntimeError::UnknownInstruction(format!("{} {token}", node.op())))
}
