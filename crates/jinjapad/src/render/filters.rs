//! Curated filter registry exposed to templates.
//!
//! Supplements minijinja's built-ins with the data-wrangling filters people
//! expect from Ansible-flavoured Jinja, grouped the same way:
//!
//! - **core**: serialization (`to_json`, `from_yaml`, ...), base64, regex,
//!   shell quoting, dictionary reshaping, path splitting
//! - **math**: logarithms, roots, set operations, human-readable sizes
//! - **urls**: `urlsplit`, `urldecode`
//!
//! None of these touch the filesystem, processes or the network.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use minijinja::value::{Kwargs, Rest, Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind};
use regex::{Regex, RegexBuilder};

/// Register every filter group on `env`.
pub fn register(env: &mut Environment<'_>) {
    register_core(env);
    register_math(env);
    register_urls(env);
}

/// Names of the filters added on top of minijinja's built-ins.
pub const FILTER_NAMES: &[&str] = &[
    // core
    "to_json",
    "to_nice_json",
    "from_json",
    "to_yaml",
    "to_nice_yaml",
    "from_yaml",
    "b64encode",
    "b64decode",
    "bool",
    "ternary",
    "mandatory",
    "regex_replace",
    "regex_search",
    "regex_findall",
    "regex_escape",
    "quote",
    "combine",
    "dict2items",
    "items2dict",
    "flatten",
    "type_debug",
    "basename",
    "dirname",
    "splitext",
    // math
    "log",
    "pow",
    "root",
    "unique",
    "union",
    "intersect",
    "difference",
    "symmetric_difference",
    "human_readable",
    "human_to_bytes",
    // urls
    "urlsplit",
    "urldecode",
];

fn register_core(env: &mut Environment<'_>) {
    env.add_filter("to_json", to_json);
    env.add_filter("to_nice_json", to_nice_json);
    env.add_filter("from_json", from_json);
    env.add_filter("to_yaml", to_yaml);
    env.add_filter("to_nice_yaml", to_yaml);
    env.add_filter("from_yaml", from_yaml);
    env.add_filter("b64encode", b64encode);
    env.add_filter("b64decode", b64decode);
    env.add_filter("bool", to_bool);
    env.add_filter("ternary", ternary);
    env.add_filter("mandatory", mandatory);
    env.add_filter("regex_replace", regex_replace);
    env.add_filter("regex_search", regex_search);
    env.add_filter("regex_findall", regex_findall);
    env.add_filter("regex_escape", regex_escape);
    env.add_filter("quote", quote);
    env.add_filter("combine", combine);
    env.add_filter("dict2items", dict2items);
    env.add_filter("items2dict", items2dict);
    env.add_filter("flatten", flatten);
    env.add_filter("type_debug", type_debug);
    env.add_filter("basename", basename);
    env.add_filter("dirname", dirname);
    env.add_filter("splitext", splitext);
}

fn register_math(env: &mut Environment<'_>) {
    env.add_filter("log", log);
    env.add_filter("pow", pow);
    env.add_filter("root", root);
    env.add_filter("unique", unique);
    env.add_filter("union", union);
    env.add_filter("intersect", intersect);
    env.add_filter("difference", difference);
    env.add_filter("symmetric_difference", symmetric_difference);
    env.add_filter("human_readable", human_readable);
    env.add_filter("human_to_bytes", human_to_bytes);
}

fn register_urls(env: &mut Environment<'_>) {
    env.add_filter("urlsplit", urlsplit);
    env.add_filter("urldecode", urldecode);
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, msg.into())
}

fn to_serde(value: &Value) -> Result<serde_json::Value, Error> {
    serde_json::to_value(value)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, "value is not serializable").with_source(e))
}

fn to_map(value: &Value, filter: &str) -> Result<serde_json::Map<String, serde_json::Value>, Error> {
    match to_serde(value)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(invalid(format!("{filter} expects a mapping"))),
    }
}

fn to_seq(value: &Value) -> Result<Vec<Value>, Error> {
    Ok(value.try_iter()?.collect())
}

// ---------------------------------------------------------------------------
// core
// ---------------------------------------------------------------------------

fn to_json(value: Value) -> Result<String, Error> {
    serde_json::to_string(&to_serde(&value)?)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, "cannot encode JSON").with_source(e))
}

fn to_nice_json(value: Value, kwargs: Kwargs) -> Result<String, Error> {
    let indent: Option<usize> = kwargs.get("indent")?;
    kwargs.assert_all_used()?;

    let indent = " ".repeat(indent.unwrap_or(4));
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(&to_serde(&value)?, &mut ser)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, "cannot encode JSON").with_source(e))?;
    String::from_utf8(out).map_err(|_| invalid("JSON output is not UTF-8"))
}

fn from_json(text: String) -> Result<Value, Error> {
    let parsed: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| Error::new(ErrorKind::CannotDeserialize, "invalid JSON").with_source(e))?;
    Ok(Value::from_serialize(&parsed))
}

fn to_yaml(value: Value) -> Result<String, Error> {
    serde_yaml::to_string(&to_serde(&value)?)
        .map_err(|e| Error::new(ErrorKind::BadSerialization, "cannot encode YAML").with_source(e))
}

fn from_yaml(text: String) -> Result<Value, Error> {
    let parsed: serde_yaml::Value = serde_yaml::from_str(&text)
        .map_err(|e| Error::new(ErrorKind::CannotDeserialize, "invalid YAML").with_source(e))?;
    Ok(Value::from_serialize(&parsed))
}

fn b64encode(text: String) -> String {
    STANDARD.encode(text.as_bytes())
}

fn b64decode(text: String) -> Result<String, Error> {
    let bytes = STANDARD
        .decode(text.trim().as_bytes())
        .map_err(|e| invalid(format!("invalid base64: {e}")))?;
    String::from_utf8(bytes).map_err(|_| invalid("decoded base64 is not UTF-8"))
}

fn to_bool(value: Value) -> Value {
    match value.kind() {
        ValueKind::None | ValueKind::Undefined | ValueKind::Bool => value,
        ValueKind::String => {
            let s = value.as_str().unwrap_or_default().trim().to_lowercase();
            Value::from(matches!(s.as_str(), "yes" | "on" | "1" | "true"))
        }
        ValueKind::Number => Value::from(value == Value::from(1)),
        _ => Value::from(false),
    }
}

fn ternary(value: Value, true_val: Value, false_val: Value, none_val: Option<Value>) -> Value {
    match none_val {
        Some(none_val) if value.is_none() => none_val,
        _ if value.is_true() => true_val,
        _ => false_val,
    }
}

fn mandatory(value: Value, msg: Option<String>) -> Result<Value, Error> {
    if value.is_undefined() {
        return Err(Error::new(
            ErrorKind::UndefinedError,
            msg.unwrap_or_else(|| "Mandatory variable not defined.".to_string()),
        ));
    }
    Ok(value)
}

fn build_regex(pattern: &str, kwargs: &Kwargs) -> Result<Regex, Error> {
    let ignorecase: Option<bool> = kwargs.get("ignorecase")?;
    let multiline: Option<bool> = kwargs.get("multiline")?;
    RegexBuilder::new(pattern)
        .case_insensitive(ignorecase.unwrap_or(false))
        .multi_line(multiline.unwrap_or(false))
        .build()
        .map_err(|e| invalid(format!("invalid regular expression: {e}")))
}

/// `\1` and `\g<name>` back-references become `${1}` and `${name}`.
fn python_replacement(replacement: &str) -> String {
    static BACKREF: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\\(\d+)|\\g<(\w+)>").expect("valid back-reference pattern")
    });

    let escaped = replacement.replace('$', "$$");
    BACKREF
        .replace_all(&escaped, |caps: &regex::Captures| {
            let group = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("${{{group}}}")
        })
        .into_owned()
}

fn regex_replace(
    value: String,
    pattern: String,
    replacement: Option<String>,
    kwargs: Kwargs,
) -> Result<String, Error> {
    let re = build_regex(&pattern, &kwargs)?;
    let count: Option<usize> = kwargs.get("count")?;
    kwargs.assert_all_used()?;

    let replacement = python_replacement(replacement.as_deref().unwrap_or(""));
    Ok(re
        .replacen(&value, count.unwrap_or(0), replacement.as_str())
        .into_owned())
}

fn regex_search(value: String, pattern: String, kwargs: Kwargs) -> Result<Value, Error> {
    let re = build_regex(&pattern, &kwargs)?;
    kwargs.assert_all_used()?;

    Ok(re
        .find(&value)
        .map(|m| Value::from(m.as_str()))
        .unwrap_or(Value::from(())))
}

/// Python `re.findall` semantics: whole matches without groups, the single
/// group's text with one group, a list of groups otherwise.
fn regex_findall(value: String, pattern: String, kwargs: Kwargs) -> Result<Value, Error> {
    let re = build_regex(&pattern, &kwargs)?;
    kwargs.assert_all_used()?;

    let groups = re.captures_len() - 1;
    let found: Vec<Value> = re
        .captures_iter(&value)
        .map(|caps| {
            let text = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
            match groups {
                0 => Value::from(text(0)),
                1 => Value::from(text(1)),
                n => Value::from((1..=n).map(|i| Value::from(text(i))).collect::<Vec<_>>()),
            }
        })
        .collect();
    Ok(Value::from(found))
}

fn regex_escape(value: String) -> String {
    regex::escape(&value)
}

/// POSIX shell quoting.
fn quote(value: String) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        value
    } else {
        format!("'{}'", value.replace('\'', "'\"'\"'"))
    }
}

fn merge(
    base: &mut serde_json::Map<String, serde_json::Value>,
    other: serde_json::Map<String, serde_json::Value>,
    recursive: bool,
) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming))
                if recursive =>
            {
                merge(existing, incoming, true);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn combine(value: Value, others: Rest<Value>, kwargs: Kwargs) -> Result<Value, Error> {
    let recursive: Option<bool> = kwargs.get("recursive")?;
    kwargs.assert_all_used()?;

    let mut merged = to_map(&value, "combine")?;
    for other in others.iter() {
        merge(&mut merged, to_map(other, "combine")?, recursive.unwrap_or(false));
    }
    Ok(Value::from_serialize(&merged))
}

fn dict2items(value: Value, kwargs: Kwargs) -> Result<Value, Error> {
    let key_name: Option<String> = kwargs.get("key_name")?;
    let value_name: Option<String> = kwargs.get("value_name")?;
    kwargs.assert_all_used()?;
    let key_name = key_name.unwrap_or_else(|| "key".to_string());
    let value_name = value_name.unwrap_or_else(|| "value".to_string());

    let items: Vec<serde_json::Value> = to_map(&value, "dict2items")?
        .into_iter()
        .map(|(k, v)| {
            let mut item = serde_json::Map::new();
            item.insert(key_name.clone(), serde_json::Value::String(k));
            item.insert(value_name.clone(), v);
            serde_json::Value::Object(item)
        })
        .collect();
    Ok(Value::from_serialize(&items))
}

fn items2dict(value: Value, kwargs: Kwargs) -> Result<Value, Error> {
    let key_name: Option<String> = kwargs.get("key_name")?;
    let value_name: Option<String> = kwargs.get("value_name")?;
    kwargs.assert_all_used()?;
    let key_name = key_name.unwrap_or_else(|| "key".to_string());
    let value_name = value_name.unwrap_or_else(|| "value".to_string());

    let serde_json::Value::Array(items) = to_serde(&value)? else {
        return Err(invalid("items2dict expects a list"));
    };

    let mut out = serde_json::Map::new();
    for item in items {
        let (Some(key), Some(val)) = (item.get(&key_name), item.get(&value_name)) else {
            return Err(invalid(format!(
                "items2dict requires '{key_name}' and '{value_name}' in every item"
            )));
        };
        let key = match key {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        out.insert(key, val.clone());
    }
    Ok(Value::from_serialize(&out))
}

fn flatten_into(out: &mut Vec<serde_json::Value>, items: Vec<serde_json::Value>, levels: Option<usize>) {
    for item in items {
        match item {
            serde_json::Value::Null => {}
            serde_json::Value::Array(inner) if levels != Some(0) => {
                flatten_into(out, inner, levels.map(|l| l - 1));
            }
            other => out.push(other),
        }
    }
}

fn flatten(value: Value, levels: Option<usize>) -> Result<Value, Error> {
    let serde_json::Value::Array(items) = to_serde(&value)? else {
        return Err(invalid("flatten expects a list"));
    };
    let mut out = Vec::new();
    flatten_into(&mut out, items, levels);
    Ok(Value::from_serialize(&out))
}

/// Python type names, as template authors coming from Jinja2 expect them.
fn type_debug(value: Value) -> &'static str {
    match value.kind() {
        ValueKind::Undefined => "Undefined",
        ValueKind::None => "NoneType",
        ValueKind::Bool => "bool",
        ValueKind::Number if value.is_integer() => "int",
        ValueKind::Number => "float",
        ValueKind::String => "str",
        ValueKind::Bytes => "bytes",
        ValueKind::Seq => "list",
        ValueKind::Map => "dict",
        _ => "object",
    }
}

fn basename(path: String) -> String {
    path.rsplit_once('/')
        .map_or(path.as_str(), |(_, tail)| tail)
        .to_string()
}

fn dirname(path: String) -> String {
    let Some((head, _)) = path.rsplit_once('/') else {
        return String::new();
    };
    let trimmed = head.trim_end_matches('/');
    if trimmed.is_empty() {
        // Only slashes: the root itself.
        head.to_string() + "/"
    } else {
        trimmed.to_string()
    }
}

fn splitext(path: String) -> Value {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();

    match name[leading_dots..].rfind('.') {
        Some(i) => {
            let dot = name_start + leading_dots + i;
            Value::from(vec![
                Value::from(&path[..dot]),
                Value::from(&path[dot..]),
            ])
        }
        None => Value::from(vec![Value::from(path.as_str()), Value::from("")]),
    }
}

// ---------------------------------------------------------------------------
// math
// ---------------------------------------------------------------------------

fn log(x: f64, base: Option<f64>) -> f64 {
    match base {
        Some(b) if (b - 2.0).abs() < f64::EPSILON => x.log2(),
        Some(b) if (b - 10.0).abs() < f64::EPSILON => x.log10(),
        Some(b) => x.ln() / b.ln(),
        None => x.ln(),
    }
}

fn pow(x: f64, y: f64) -> f64 {
    x.powf(y)
}

fn root(x: f64, base: Option<f64>) -> f64 {
    match base {
        None => x.sqrt(),
        Some(b) if (b - 2.0).abs() < f64::EPSILON => x.sqrt(),
        Some(b) => x.powf(1.0 / b),
    }
}

fn dedup(items: impl IntoIterator<Item = Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn unique(value: Value) -> Result<Value, Error> {
    Ok(Value::from(dedup(to_seq(&value)?)))
}

fn union(a: Value, b: Value) -> Result<Value, Error> {
    Ok(Value::from(dedup(to_seq(&a)?.into_iter().chain(to_seq(&b)?))))
}

fn intersect(a: Value, b: Value) -> Result<Value, Error> {
    let b = to_seq(&b)?;
    Ok(Value::from(dedup(
        to_seq(&a)?.into_iter().filter(|x| b.contains(x)),
    )))
}

fn difference(a: Value, b: Value) -> Result<Value, Error> {
    let b = to_seq(&b)?;
    Ok(Value::from(dedup(
        to_seq(&a)?.into_iter().filter(|x| !b.contains(x)),
    )))
}

fn symmetric_difference(a: Value, b: Value) -> Result<Value, Error> {
    let a = to_seq(&a)?;
    let b = to_seq(&b)?;
    let left = a.iter().filter(|x| !b.contains(x)).cloned();
    let right = b.iter().filter(|x| !a.contains(x)).cloned();
    Ok(Value::from(dedup(left.chain(right).collect::<Vec<_>>())))
}

/// Binary size suffixes, largest first.
const SIZE_RANGES: &[(char, f64)] = &[
    ('Y', 1_208_925_819_614_629_174_706_176.0),
    ('Z', 1_180_591_620_717_411_303_424.0),
    ('E', 1_152_921_504_606_846_976.0),
    ('P', 1_125_899_906_842_624.0),
    ('T', 1_099_511_627_776.0),
    ('G', 1_073_741_824.0),
    ('M', 1_048_576.0),
    ('K', 1024.0),
    ('B', 1.0),
];

fn human_readable(size: f64, kwargs: Kwargs) -> Result<String, Error> {
    let isbits: Option<bool> = kwargs.get("isbits")?;
    let unit: Option<String> = kwargs.get("unit")?;
    kwargs.assert_all_used()?;

    let base = if isbits.unwrap_or(false) { "bits" } else { "Bytes" };
    let wanted = unit
        .as_deref()
        .and_then(|u| u.chars().next())
        .map(|c| c.to_ascii_uppercase());

    let (suffix, limit) = SIZE_RANGES
        .iter()
        .copied()
        .find(|(suffix, limit)| match wanted {
            Some(w) => w == *suffix,
            None => size >= *limit,
        })
        .unwrap_or(('B', 1.0));

    let label = if limit == 1.0 {
        base.to_string()
    } else {
        format!("{suffix}{}", &base[..1])
    };
    Ok(format!("{:.2} {label}", size / limit))
}

fn human_to_bytes(value: Value, default_unit: Option<String>) -> Result<i64, Error> {
    static SIZE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^\s*(\d*\.?\d+)\s*([A-Za-z]+)?\s*$").expect("valid size pattern")
    });

    let text = match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    };
    let caps = SIZE
        .captures(&text)
        .ok_or_else(|| invalid(format!("human_to_bytes() can't interpret {text:?}")))?;

    let number: f64 = caps[1]
        .parse()
        .map_err(|_| invalid(format!("human_to_bytes() can't interpret {text:?}")))?;
    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .or(default_unit)
        .unwrap_or_else(|| "B".to_string());

    let first = unit
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('B');
    let (_, multiplier) = SIZE_RANGES
        .iter()
        .copied()
        .find(|(suffix, _)| *suffix == first)
        .ok_or_else(|| invalid(format!("human_to_bytes() unknown unit {unit:?}")))?;

    Ok((number * multiplier).round() as i64)
}

// ---------------------------------------------------------------------------
// urls
// ---------------------------------------------------------------------------

fn urlsplit(value: String, query: Option<String>) -> Result<Value, Error> {
    let url = url::Url::parse(&value).map_err(|e| invalid(format!("invalid URL: {e}")))?;

    let hostname = url.host_str().map(str::to_lowercase);
    let port = url.port();
    let username = Some(url.username())
        .filter(|u| !u.is_empty())
        .map(str::to_string);
    let password = url.password().map(str::to_string);

    let mut netloc = String::new();
    if let Some(user) = &username {
        netloc.push_str(user);
        if let Some(pass) = &password {
            netloc.push(':');
            netloc.push_str(pass);
        }
        netloc.push('@');
    }
    if let Some(host) = url.host_str() {
        netloc.push_str(host);
    }
    if let Some(port) = port {
        netloc.push_str(&format!(":{port}"));
    }

    let parts = serde_json::json!({
        "fragment": url.fragment().unwrap_or(""),
        "hostname": hostname,
        "netloc": netloc,
        "password": password,
        "path": url.path(),
        "port": port,
        "query": url.query().unwrap_or(""),
        "scheme": url.scheme(),
        "username": username,
    });

    match query {
        Some(field) => parts
            .get(&field)
            .map(Value::from_serialize)
            .ok_or_else(|| invalid(format!("urlsplit: unknown URL component {field:?}"))),
        None => Ok(Value::from_serialize(&parts)),
    }
}

/// `unquote_plus` semantics: `+` is a space, `%XX` escapes are decoded.
fn urldecode(value: String) -> String {
    percent_encoding::percent_decode_str(&value.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn render(template: &str, data: serde_json::Value) -> String {
        let mut env = Environment::new();
        register(&mut env);
        env.render_str(template, context! { data => Value::from_serialize(&data) })
            .unwrap()
    }

    fn render_err(template: &str) -> Error {
        let mut env = Environment::new();
        register(&mut env);
        env.render_str(template, context! {}).unwrap_err()
    }

    #[test]
    fn json_filters() {
        let data = serde_json::json!({"a": [1, 2]});
        assert_eq!(render("{{ data | to_json }}", data.clone()), r#"{"a":[1,2]}"#);
        assert_eq!(
            render("{{ data | to_nice_json(indent=2) }}", data),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
        assert_eq!(
            render(r#"{{ ('{"x": 5}' | from_json).x }}"#, serde_json::json!({})),
            "5"
        );
    }

    #[test]
    fn yaml_filters() {
        let data = serde_json::json!({"name": "app"});
        assert_eq!(render("{{ data | to_yaml }}", data), "name: app\n");
        assert_eq!(
            render("{{ ('port: 8080' | from_yaml).port }}", serde_json::json!({})),
            "8080"
        );
    }

    #[test]
    fn base64_filters() {
        assert_eq!(
            render("{{ 'hello' | b64encode }}", serde_json::json!({})),
            "aGVsbG8="
        );
        assert_eq!(
            render("{{ 'aGVsbG8=' | b64decode }}", serde_json::json!({})),
            "hello"
        );
    }

    #[test]
    fn bool_and_ternary() {
        let data = serde_json::json!({"flag": "yes", "off": "no"});
        assert_eq!(render("{{ data.flag | bool }}", data.clone()), "True");
        assert_eq!(render("{{ data.off | bool }}", data.clone()), "False");
        assert_eq!(
            render("{{ (data.flag | bool) | ternary('on', 'off') }}", data),
            "on"
        );
        assert_eq!(
            render("{{ none | ternary('t', 'f', 'n') }}", serde_json::json!({})),
            "n"
        );
    }

    #[test]
    fn mandatory_fails_on_undefined() {
        let err = render_err("{{ missing | mandatory }}");
        assert!(err.to_string().contains("Mandatory"));
    }

    #[test]
    fn regex_filters() {
        let data = serde_json::json!({"s": "host-01.example.com"});
        assert_eq!(
            render(r#"{{ data.s | regex_replace('^(\\w+)-(\\d+).*$', '\\2:\\1') }}"#, data.clone()),
            "01:host"
        );
        assert_eq!(
            render(r#"{{ data.s | regex_search('\\d+') }}"#, data.clone()),
            "01"
        );
        assert_eq!(
            render(r#"{{ data.s | regex_findall('[a-z]+') | join(',') }}"#, data),
            "host,example,com"
        );
        assert_eq!(
            render("{{ 'a.b' | regex_escape }}", serde_json::json!({})),
            r"a\.b"
        );
    }

    #[test]
    fn regex_replace_ignorecase() {
        assert_eq!(
            render(
                "{{ 'ABC' | regex_replace('b', 'x', ignorecase=true) }}",
                serde_json::json!({})
            ),
            "AxC"
        );
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = render_err("{{ 'a' | regex_search('(') }}");
        assert!(err.to_string().contains("invalid regular expression"));
    }

    #[test]
    fn quote_filter() {
        assert_eq!(quote("simple".into()), "simple");
        assert_eq!(quote("it's here".into()), r#"'it'"'"'s here'"#);
        assert_eq!(quote(String::new()), "''");
    }

    #[test]
    fn dict_filters() {
        let data = serde_json::json!({"a": {"x": 1, "y": 2}, "b": {"y": 3}});
        assert_eq!(
            render("{{ data.a | combine(data.b) | to_json }}", data.clone()),
            r#"{"x":1,"y":3}"#
        );
        assert_eq!(
            render(
                "{{ {'a': {'p': 1}} | combine({'a': {'q': 2}}, recursive=true) | to_json }}",
                data.clone()
            ),
            r#"{"a":{"p":1,"q":2}}"#
        );
        assert_eq!(
            render("{{ data.b | dict2items | to_json }}", data.clone()),
            r#"[{"key":"y","value":3}]"#
        );
        assert_eq!(
            render(
                "{{ [{'key': 'k', 'value': 'v'}] | items2dict | to_json }}",
                data
            ),
            r#"{"k":"v"}"#
        );
    }

    #[test]
    fn dict_filters_keep_insertion_order() {
        let data = serde_json::json!({"zeta": 1, "alpha": 2});
        assert_eq!(
            render("{{ data | dict2items | map(attribute='key') | join(',') }}", data.clone()),
            "zeta,alpha"
        );
        assert_eq!(
            render("{{ data | combine({'mid': 3}) | to_json }}", data),
            r#"{"zeta":1,"alpha":2,"mid":3}"#
        );
    }

    #[test]
    fn flatten_filter() {
        let data = serde_json::json!([1, [2, [3, null]], [4]]);
        assert_eq!(render("{{ data | flatten | to_json }}", data.clone()), "[1,2,3,4]");
        assert_eq!(
            render("{{ data | flatten(1) | to_json }}", data),
            "[1,2,[3,null],4]"
        );
    }

    #[test]
    fn type_debug_filter() {
        let data = serde_json::json!({"i": 1, "f": 1.5, "s": "x", "l": [], "d": {}, "n": null});
        assert_eq!(
            render(
                "{{ data.i | type_debug }} {{ data.f | type_debug }} {{ data.s | type_debug }} {{ data.l | type_debug }} {{ data.d | type_debug }} {{ data.n | type_debug }}",
                data
            ),
            "int float str list dict NoneType"
        );
    }

    #[test]
    fn path_filters() {
        assert_eq!(basename("/etc/hosts".into()), "hosts");
        assert_eq!(basename("hosts".into()), "hosts");
        assert_eq!(dirname("/etc/hosts".into()), "/etc");
        assert_eq!(dirname("/hosts".into()), "/");
        assert_eq!(dirname("hosts".into()), "");
        assert_eq!(
            splitext("dir/archive.tar.gz".into()),
            Value::from(vec![Value::from("dir/archive.tar"), Value::from(".gz")])
        );
        assert_eq!(
            splitext(".bashrc".into()),
            Value::from(vec![Value::from(".bashrc"), Value::from("")])
        );
    }

    #[test]
    fn math_filters() {
        let empty = serde_json::json!({});
        assert_eq!(render("{{ 8 | log(2) }}", empty.clone()), "3.0");
        assert_eq!(render("{{ 2 | pow(3) }}", empty.clone()), "8.0");
        assert_eq!(render("{{ 27 | root(3) | round }}", empty.clone()), "3.0");
        assert_eq!(render("{{ 16 | root }}", empty), "4.0");
    }

    #[test]
    fn set_filters() {
        let data = serde_json::json!({"a": [1, 2, 2, 3], "b": [2, 3, 4]});
        assert_eq!(render("{{ data.a | unique | to_json }}", data.clone()), "[1,2,3]");
        assert_eq!(render("{{ data.a | union(data.b) | to_json }}", data.clone()), "[1,2,3,4]");
        assert_eq!(render("{{ data.a | intersect(data.b) | to_json }}", data.clone()), "[2,3]");
        assert_eq!(render("{{ data.a | difference(data.b) | to_json }}", data.clone()), "[1]");
        assert_eq!(
            render("{{ data.a | symmetric_difference(data.b) | to_json }}", data),
            "[1,4]"
        );
    }

    #[test]
    fn size_filters() {
        let empty = serde_json::json!({});
        assert_eq!(render("{{ 1024 | human_readable }}", empty.clone()), "1.00 KB");
        assert_eq!(render("{{ 10 | human_readable }}", empty.clone()), "10.00 Bytes");
        assert_eq!(
            render("{{ 1048576 | human_readable(unit='K') }}", empty.clone()),
            "1024.00 KB"
        );
        assert_eq!(render("{{ '1K' | human_to_bytes }}", empty.clone()), "1024");
        assert_eq!(render("{{ '10 MB' | human_to_bytes }}", empty.clone()), "10485760");
        assert_eq!(render("{{ '2' | human_to_bytes('K') }}", empty), "2048");
    }

    #[test]
    fn url_filters() {
        let data = serde_json::json!({"u": "https://user:pw@Example.com:8443/p/a?x=1#frag"});
        assert_eq!(render("{{ data.u | urlsplit('hostname') }}", data.clone()), "example.com");
        assert_eq!(render("{{ data.u | urlsplit('port') }}", data.clone()), "8443");
        assert_eq!(render("{{ (data.u | urlsplit).query }}", data.clone()), "x=1");
        assert_eq!(
            render("{{ (data.u | urlsplit).netloc }}", data),
            "user:pw@example.com:8443"
        );
        assert_eq!(
            render("{{ 'a%20b+c' | urldecode }}", serde_json::json!({})),
            "a b c"
        );
    }
}
