//! Core value types: node keys, slot kinds and the slot values they carry.

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a scene node. Unique within one tree.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        NodeKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKey {
    fn from(key: &str) -> Self {
        NodeKey(key.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(key: String) -> Self {
        NodeKey(key)
    }
}

/// The kinds of context a node can define locally or inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SlotKind {
    TimeRange,
    DataProvider,
    EditorController,
}

impl SlotKind {
    pub const ALL: [SlotKind; 3] = [
        SlotKind::TimeRange,
        SlotKind::DataProvider,
        SlotKind::EditorController,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::TimeRange => "timeRange",
            SlotKind::DataProvider => "dataProvider",
            SlotKind::EditorController => "editorController",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timeRange" | "time-range" | "time_range" => Ok(SlotKind::TimeRange),
            "dataProvider" | "data-provider" | "data_provider" | "data" => {
                Ok(SlotKind::DataProvider)
            }
            "editorController" | "editor-controller" | "editor_controller" | "editor" => {
                Ok(SlotKind::EditorController)
            }
            other => Err(format!(
                "Unknown slot kind '{}' (expected timeRange, dataProvider or editorController)",
                other
            )),
        }
    }
}

/// A value held by a context slot. The variant always matches the slot kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotValue {
    TimeRange(TimeRange),
    DataProvider(DataProviderRef),
    Editor(EditorRef),
}

impl SlotValue {
    pub fn kind(&self) -> SlotKind {
        match self {
            SlotValue::TimeRange(_) => SlotKind::TimeRange,
            SlotValue::DataProvider(_) => SlotKind::DataProvider,
            SlotValue::Editor(_) => SlotKind::EditorController,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            SlotValue::TimeRange(range) => range.validate(),
            SlotValue::DataProvider(provider) => provider.validate(),
            SlotValue::Editor(editor) => {
                if editor.id.trim().is_empty() {
                    Err("editor id cannot be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Encode the payload without the variant tag; the slot kind carries it.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            SlotValue::TimeRange(range) => serde_json::to_value(range),
            SlotValue::DataProvider(provider) => serde_json::to_value(provider),
            SlotValue::Editor(editor) => serde_json::to_value(editor),
        }
    }

    pub fn from_json(kind: SlotKind, value: serde_json::Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            SlotKind::TimeRange => SlotValue::TimeRange(serde_json::from_value(value)?),
            SlotKind::DataProvider => SlotValue::DataProvider(serde_json::from_value(value)?),
            SlotKind::EditorController => SlotValue::Editor(serde_json::from_value(value)?),
        })
    }

    /// Short human readable form for tables and logs.
    pub fn summary(&self) -> String {
        match self {
            SlotValue::TimeRange(range) => format!("{} to {}", range.from, range.to),
            SlotValue::DataProvider(provider) => {
                let refs: Vec<&str> = provider.queries.iter().map(|q| q.ref_id.as_str()).collect();
                format!("{}:{} [{}]", provider.provider_type, provider.uid, refs.join(","))
            }
            SlotValue::Editor(editor) => editor.id.clone(),
        }
    }
}

/// A time window expressed as relative (`now-1y`) or RFC 3339 endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// `now-<span>` to `now`, e.g. `TimeRange::last("7d")`.
    pub fn last(span: &str) -> Self {
        Self::new(format!("now-{}", span), "now")
    }

    /// Evaluate both endpoints against `now`.
    pub fn to_absolute(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>), String> {
        let from = parse_instant(&self.from, now)?;
        let to = parse_instant(&self.to, now)?;
        Ok((from, to))
    }

    pub fn is_relative(expr: &str) -> bool {
        expr.trim().starts_with("now")
    }

    /// Both endpoints must parse. They are only ordered against each other
    /// when both are relative or both absolute, so the outcome does not
    /// depend on the wall clock.
    pub fn validate(&self) -> Result<(), String> {
        let (from, to) = self.to_absolute(Utc::now())?;
        let comparable = Self::is_relative(&self.from) == Self::is_relative(&self.to);
        if comparable && from > to {
            return Err(format!("'{}' is later than '{}'", self.from, self.to));
        }
        Ok(())
    }
}

fn parse_instant(expr: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, String> {
    let expr = expr.trim();
    let Some(offset) = expr.strip_prefix("now") else {
        return DateTime::parse_from_rfc3339(expr)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| format!("'{}' is neither relative nor RFC 3339: {}", expr, e));
    };
    if offset.is_empty() {
        return Ok(now);
    }

    let mut chars = offset.chars();
    let sign = chars.next();
    let rest = chars.as_str();
    let unit_at = rest
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| format!("'{}' is missing a unit", expr))?;
    let (digits, unit) = rest.split_at(unit_at);
    let amount: u32 = digits
        .parse()
        .map_err(|_| format!("'{}' has no amount", expr))?;

    let shifted = match (sign, unit) {
        (Some(sign @ ('-' | '+')), "M" | "y") => {
            let months = if unit == "y" { amount.saturating_mul(12) } else { amount };
            let months = Months::new(months);
            if sign == '-' {
                now.checked_sub_months(months)
            } else {
                now.checked_add_months(months)
            }
        }
        (Some(sign @ ('-' | '+')), "s" | "m" | "h" | "d" | "w") => {
            let amount = i64::from(amount);
            let span = match unit {
                "s" => Duration::seconds(amount),
                "m" => Duration::minutes(amount),
                "h" => Duration::hours(amount),
                "d" => Duration::days(amount),
                _ => Duration::weeks(amount),
            };
            if sign == '-' {
                now.checked_sub_signed(span)
            } else {
                now.checked_add_signed(span)
            }
        }
        _ => return Err(format!("'{}' is not a valid relative time", expr)),
    };
    shifted.ok_or_else(|| format!("'{}' is out of range", expr))
}

/// Provider uid whose queries each name their own datasource.
pub const MIXED_DATASOURCE_UID: &str = "-- Mixed --";

/// The datasource one query runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    pub uid: String,
    #[serde(rename = "type")]
    pub datasource_type: String,
}

impl DatasourceRef {
    pub fn new(uid: impl Into<String>, datasource_type: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            datasource_type: datasource_type.into(),
        }
    }
}

/// A single query within a data provider, addressed by its ref id.
///
/// `datasource` is unset when the query runs against the provider's own
/// datasource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRef {
    #[serde(alias = "refid")]
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<DatasourceRef>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// Opaque descriptor of a data provider: which datasource and which queries.
///
/// The scene graph never runs these queries; it only hands the resolved
/// descriptor to whoever does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataProviderRef {
    pub uid: String,
    #[serde(rename = "type")]
    pub provider_type: String,
    #[serde(default)]
    pub queries: Vec<QueryRef>,
    #[serde(default, alias = "maxdatapoints", skip_serializing_if = "Option::is_none")]
    pub max_data_points: Option<u32>,
    #[serde(default, alias = "mininterval", skip_serializing_if = "Option::is_none")]
    pub min_interval: Option<String>,
}

impl DataProviderRef {
    pub fn new(uid: impl Into<String>, provider_type: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            provider_type: provider_type.into(),
            queries: Vec::new(),
            max_data_points: None,
            min_interval: None,
        }
    }

    /// A provider whose queries pick their datasources one by one.
    pub fn mixed() -> Self {
        Self::new(MIXED_DATASOURCE_UID, "datasource")
    }

    pub fn is_mixed(&self) -> bool {
        self.uid == MIXED_DATASOURCE_UID
    }

    /// Append a query under the next free ref id and return that id.
    pub fn add_query(&mut self, params: BTreeMap<String, String>) -> String {
        self.push_query(None, params)
    }

    /// Append a query bound to its own datasource, as mixed providers need.
    pub fn add_query_for(
        &mut self,
        datasource: DatasourceRef,
        params: BTreeMap<String, String>,
    ) -> String {
        self.push_query(Some(datasource), params)
    }

    fn push_query(
        &mut self,
        datasource: Option<DatasourceRef>,
        params: BTreeMap<String, String>,
    ) -> String {
        let ref_id = self.next_ref_id();
        self.queries.push(QueryRef {
            ref_id: ref_id.clone(),
            datasource,
            params,
        });
        ref_id
    }

    /// Builder form of [`DataProviderRef::add_query`].
    pub fn with_query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.add_query(params);
        self
    }

    /// First unused id in the sequence A..Z, AA, AB, ...
    pub fn next_ref_id(&self) -> String {
        let used: BTreeSet<&str> = self.queries.iter().map(|q| q.ref_id.as_str()).collect();
        (0usize..)
            .map(ref_id_for_index)
            .find(|id| !used.contains(id.as_str()))
            .unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.uid.trim().is_empty() {
            return Err("datasource uid cannot be empty".to_string());
        }
        if self.max_data_points == Some(0) {
            return Err("max data points must be positive".to_string());
        }
        if let Some(interval) = &self.min_interval {
            if interval.trim().is_empty() {
                return Err("min interval cannot be blank".to_string());
            }
        }
        let mut seen = BTreeSet::new();
        for query in &self.queries {
            if query.ref_id.trim().is_empty() {
                return Err("query ref id cannot be empty".to_string());
            }
            if !seen.insert(query.ref_id.as_str()) {
                return Err(format!("duplicate query ref id '{}'", query.ref_id));
            }
            match &query.datasource {
                Some(ds) if ds.uid.trim().is_empty() || ds.uid == MIXED_DATASOURCE_UID => {
                    return Err(format!(
                        "query '{}' needs a concrete datasource, got '{}'",
                        query.ref_id, ds.uid
                    ));
                }
                None if self.is_mixed() => {
                    return Err(format!(
                        "query '{}' of a mixed provider has no datasource",
                        query.ref_id
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn ref_id_for_index(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Reference to the edit controller that owns a scene's editing session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorRef {
    pub id: String,
}

impl EditorRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}
