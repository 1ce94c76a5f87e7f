use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use tracing::debug;

use crate::mapper::Fielder;
use crate::sql::{assign, Column, Expression, SqlValue, PLACEHOLDER};

/// # Mapper
///
/// An ordered, duplicate-free list of column names, used to project
/// entities onto SQL. The column order is also the order of values and
/// arguments in everything the mapper produces, so one mapper used against
/// many entities always yields rows aligned with [`Mapper::columns()`].
///
/// ```
/// let users = Mapper::new(["id", "name", "email"]);
/// let (keys, updatable) = users.split(["id"]);
///
/// let (sql, args) = build!(
///     "UPDATE users SET", updatable.format_update_sets(&user)?,
///     "WHERE", keys.format_update_sets(&user)?,
/// );
/// ```
///
/// Values written by the mapper follow a fixed escaping rule: text, byte
/// blobs, timestamps and non-finite floats always become a `?` placeholder
/// with a bound argument. Everything else (numbers, booleans, decimals,
/// `NULL`) is written inline.
///
/// Mappers never change after construction, [`Mapper::split()`] and
/// [`Mapper::append()`] return new ones.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    columns: IndexSet<String>,
}

impl Mapper {
    /// Repeated names are dropped, the first occurrence keeps its position.
    pub fn new<I, S>(columns: I) -> Mapper
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mapper {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    pub fn column_string(&self) -> String {
        self.columns().join(", ")
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns.get(name).map(|c| Column::new(c.as_str()))
    }

    /// Splits into the columns found in `subset` and the rest, each keeping
    /// its original relative order.
    pub fn split<I, S>(&self, subset: I) -> (Mapper, Mapper)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted: HashSet<String> = subset.into_iter().map(|s| s.as_ref().to_string()).collect();
        let (inside, outside): (IndexSet<String>, IndexSet<String>) = self
            .columns
            .iter()
            .cloned()
            .partition(|column| wanted.contains(column));

        (Mapper { columns: inside }, Mapper { columns: outside })
    }

    pub fn append<I, S>(&self, names: I) -> Mapper
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = self.columns.clone();
        columns.extend(names.into_iter().map(Into::into));
        Mapper { columns }
    }

    fn value_of<F: Fielder + ?Sized>(entity: &F, column: &str) -> Result<SqlValue> {
        entity
            .field(column)
            .map(|field| field.to_value())
            .ok_or_else(|| anyhow!("entity has no field for column `{}`", column))
    }

    /// Dereferenced field values, one per column, in column order.
    pub fn fields<F: Fielder + ?Sized>(&self, entity: &F) -> Result<Vec<SqlValue>> {
        self.columns
            .iter()
            .map(|column| Self::value_of(entity, column))
            .collect()
    }

    /// `(v1,v2),(v3,v4),...` with one tuple per entity.
    pub fn format_insert_values<'a, F, I>(&self, entities: I) -> Result<Expression>
    where
        I: IntoIterator<Item = &'a F>,
        F: Fielder + ?Sized + 'a,
    {
        let mut sql = String::new();
        let mut args = Vec::new();
        let mut rows = 0;

        for entity in entities {
            if rows > 0 {
                sql.push(',');
            }
            sql.push('(');
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    sql.push(',');
                }
                let value = Self::value_of(entity, column)
                    .with_context(|| format!("formatting insert row {}", rows))?;
                push_value(&mut sql, &mut args, value);
            }
            sql.push(')');
            rows += 1;
        }

        debug!(columns = self.len(), rows, args = args.len(), "formatted insert values");
        Ok(Expression::new(sql, args))
    }

    /// `(c1, c2) VALUES (v1,v2),...`
    pub fn format_insert<'a, F, I>(&self, entities: I) -> Result<Expression>
    where
        I: IntoIterator<Item = &'a F>,
        F: Fielder + ?Sized + 'a,
    {
        let columns = Expression::new(format!("({})", self.column_string()), vec![]);
        let values = self.format_insert_values(entities)?;
        Ok(Expression::from_vec(vec![columns, values], " VALUES "))
    }

    /// `c1=v1,c2=v2,...` for one entity.
    pub fn format_update_sets<F: Fielder + ?Sized>(&self, entity: &F) -> Result<Expression> {
        let mut sql = String::new();
        let mut args = Vec::new();

        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
            let value = Self::value_of(entity, column).context("formatting update sets")?;
            sql.push_str(column);
            sql.push('=');
            push_value(&mut sql, &mut args, value);
        }

        debug!(columns = self.len(), args = args.len(), "formatted update sets");
        Ok(Expression::new(sql, args))
    }

    /// Field values keyed by column, in column order.
    pub fn pack_dict<F: Fielder + ?Sized>(&self, entity: &F) -> Result<IndexMap<String, SqlValue>> {
        self.columns
            .iter()
            .map(|column| -> Result<(String, SqlValue)> {
                Ok((column.clone(), Self::value_of(entity, column)?))
            })
            .collect()
    }

    /// Writes every column present in `dict` into the entity. Columns missing
    /// from `dict` are left alone. Stops at the first column that cannot be
    /// written, leaving earlier columns already assigned.
    pub fn load_from_dict<F: Fielder + ?Sized>(
        &self,
        dict: &IndexMap<String, SqlValue>,
        entity: &mut F,
    ) -> Result<()> {
        for column in &self.columns {
            let Some(value) = dict.get(column) else {
                continue;
            };
            let slot = entity
                .field_mut(column)
                .ok_or_else(|| anyhow!("entity has no field for column `{}`", column))?;
            assign(slot, value).with_context(|| format!("loading column `{}`", column))?;
        }
        Ok(())
    }

    pub fn pack_json<F: Fielder + ?Sized>(&self, entity: &F) -> Result<Map<String, Value>> {
        Ok(self
            .pack_dict(entity)?
            .into_iter()
            .map(|(column, value)| (column, value.to_json()))
            .collect())
    }

    pub fn load_from_json<F: Fielder + ?Sized>(
        &self,
        json: &Map<String, Value>,
        entity: &mut F,
    ) -> Result<()> {
        let dict = json
            .iter()
            .map(|(column, value)| (column.clone(), SqlValue::from(value.clone())))
            .collect();
        self.load_from_dict(&dict, entity)
    }
}

fn push_value(sql: &mut String, args: &mut Vec<SqlValue>, value: SqlValue) {
    if value.needs_binding() {
        sql.push_str(PLACEHOLDER);
        args.push(value);
    } else {
        sql.push_str(&value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::impl_fielder;
    use crate::sql::Chunk;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Row {
        field_1: String,
        field_2: String,
        field_3: i32,
        nickname: Option<String>,
        created: DateTime<Utc>,
        avatar: Vec<u8>,
        ratio: f64,
    }

    impl_fielder!(Row {
        "field_1" => field_1,
        "field_2" => field_2,
        "field_3" => field_3,
        "nickname" => nickname,
        "created" => created,
        "avatar" => avatar,
        "ratio" => ratio,
    });

    fn row(a: &str, b: &str, n: i32) -> Row {
        Row {
            field_1: a.into(),
            field_2: b.into(),
            field_3: n,
            ..Default::default()
        }
    }

    fn text(s: &str) -> SqlValue {
        SqlValue::Text(s.into())
    }

    #[test]
    fn test_columns() {
        let mapper = Mapper::new(["b", "a", "b", "c"]);

        assert_eq!(mapper.columns(), vec!["b", "a", "c"]);
        assert_eq!(mapper.column_string(), "b, a, c");
        assert!(mapper.contains("a"));
        assert_eq!(mapper.column("c").map(|c| c.name().to_string()), Some("c".to_string()));
        assert!(mapper.column("z").is_none());
    }

    #[test]
    fn test_fields_alignment() {
        let mapper = Mapper::new(["field_3", "field_1", "field_2"]);
        let fields = mapper.fields(&row("x", "y", 9)).unwrap();

        assert_eq!(fields, vec![SqlValue::Int(9), text("x"), text("y")]);
    }

    #[test]
    fn test_insert_values_two_rows() {
        let mapper = Mapper::new(["field_1", "field_2"]);
        let rows = vec![row("1", "2", 0), row("3", "4", 0)];

        let (sql, args) = mapper.format_insert_values(&rows).unwrap().split();

        assert_eq!(sql, "(?,?),(?,?)");
        assert_eq!(args, vec![text("1"), text("2"), text("3"), text("4")]);
    }

    #[test]
    fn test_insert_escaping_policy() {
        let created = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let mapper = Mapper::new(["field_3", "nickname", "created", "avatar"]);
        let mut r = row("", "", 5);
        r.created = created;
        r.avatar = vec![1, 2];

        let (sql, args) = mapper.format_insert(vec![&r]).unwrap().split();

        assert_eq!(sql, "(field_3, nickname, created, avatar) VALUES (5,NULL,?,?)");
        assert_eq!(
            args,
            vec![SqlValue::Timestamp(created), SqlValue::Bytes(vec![1, 2])]
        );

        r.nickname = Some("doc".into());
        let (sql, args) = mapper.format_insert_values([&r]).unwrap().split();
        assert_eq!(sql, "(5,?,?,?)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_non_finite_floats_are_bound() {
        let mapper = Mapper::new(["field_3", "ratio"]);
        let mut r = row("", "", 1);
        r.ratio = f64::NAN;

        let (sql, args) = mapper.format_insert_values([&r]).unwrap().split();
        assert_eq!(sql, "(1,?)");
        assert_eq!(args.len(), 1);
        assert!(matches!(args[0], SqlValue::Float(f) if f.is_nan()));

        r.ratio = f64::INFINITY;
        let (sql, args) = mapper.format_update_sets(&r).unwrap().split();
        assert_eq!(sql, "field_3=1,ratio=?");
        assert_eq!(args, vec![SqlValue::Float(f64::INFINITY)]);

        r.ratio = 0.5;
        let (sql, args) = mapper.format_update_sets(&r).unwrap().split();
        assert_eq!(sql, "field_3=1,ratio=0.5");
        assert!(args.is_empty());
    }

    #[test]
    fn test_update_sets() {
        let mapper = Mapper::new(["field_1", "field_3", "field_2"]);
        let (sql, args) = mapper.format_update_sets(&row("a", "b", 3)).unwrap().split();

        assert_eq!(sql, "field_1=?,field_3=3,field_2=?");
        assert_eq!(args, vec![text("a"), text("b")]);
    }

    #[test]
    fn test_split_completeness() {
        let mapper = Mapper::new(["id", "name", "email", "created", "role"]);
        let (keys, rest) = mapper.split(["role", "id", "missing"]);

        assert_eq!(keys.columns(), vec!["id", "role"]);
        assert_eq!(rest.columns(), vec!["name", "email", "created"]);
        assert_eq!(keys.len() + rest.len(), mapper.len());
        assert_eq!(mapper.len(), 5);
    }

    #[test]
    fn test_append() {
        let mapper = Mapper::new(["a", "b"]);
        let appended = mapper.append(["c", "a", "d", "c"]);

        assert_eq!(appended.columns(), vec!["a", "b", "c", "d"]);
        assert_eq!(mapper.columns(), vec!["a", "b"]);
    }

    #[test]
    fn test_missing_column() {
        let mapper = Mapper::new(["field_1", "colour", "field_2"]);

        let err = mapper.fields(&row("a", "b", 1)).unwrap_err();
        assert_eq!(err.to_string(), "entity has no field for column `colour`");

        let err = mapper.format_insert_values(&[row("a", "b", 1)]).unwrap_err();
        assert_eq!(err.to_string(), "formatting insert row 0");
        assert_eq!(err.root_cause().to_string(), "entity has no field for column `colour`");

        assert!(mapper.format_update_sets(&row("a", "b", 1)).is_err());
    }

    #[test]
    fn test_pack_and_load_dict() {
        let mapper = Mapper::new(["field_1", "field_2", "field_3"]);
        let source = row("1", "2", 1);

        let dict = mapper.pack_dict(&source).unwrap();
        assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["field_1", "field_2", "field_3"]);

        let mut target = Row::default();
        mapper.load_from_dict(&dict, &mut target).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_load_skips_absent_columns() {
        let mapper = Mapper::new(["field_1", "field_2", "field_3"]);
        let mut dict = IndexMap::new();
        dict.insert("field_2".to_string(), text("new"));
        dict.insert("unmapped".to_string(), text("ignored"));

        let mut target = row("old", "old", 7);
        mapper.load_from_dict(&dict, &mut target).unwrap();

        assert_eq!(target, row("old", "new", 7));
    }

    #[test]
    fn test_load_rejects_wrong_kind() {
        let mapper = Mapper::new(["field_3"]);
        let mut dict = IndexMap::new();
        dict.insert("field_3".to_string(), text("three"));

        let err = mapper.load_from_dict(&dict, &mut Row::default()).unwrap_err();
        assert_eq!(err.to_string(), "loading column `field_3`");
        assert_eq!(err.root_cause().to_string(), "cannot assign text value to i32 slot");
    }

    #[test]
    fn test_json_round_trip() {
        let mapper = Mapper::new(["field_1", "field_3", "nickname", "created", "avatar"]);
        let mut source = row("x", "", 42);
        source.created = Utc.with_ymd_and_hms(2020, 2, 29, 12, 0, 0).unwrap();
        source.avatar = vec![7, 8, 9];

        let json = mapper.pack_json(&source).unwrap();
        assert_eq!(
            Value::Object(json.clone()),
            json!({
                "field_1": "x",
                "field_3": 42,
                "nickname": null,
                "created": "2020-02-29T12:00:00Z",
                "avatar": [7, 8, 9]
            })
        );

        let mut target = row("", "", 0);
        target.nickname = Some("stale".into());
        mapper.load_from_json(&json, &mut target).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_json_round_trip_empty_blob() {
        let mapper = Mapper::new(["field_3", "avatar"]);
        let source = row("", "", 5);

        let json = mapper.pack_json(&source).unwrap();
        assert_eq!(Value::Object(json.clone()), json!({ "field_3": 5, "avatar": [] }));

        let mut target = row("", "", 0);
        target.avatar = vec![1, 2, 3];
        mapper.load_from_json(&json, &mut target).unwrap();
        assert_eq!(target, source);
    }

    #[test]
    fn test_update_statement() {
        let mapper = Mapper::new(["field_1", "field_2", "field_3"]);
        let (keys, sets) = mapper.split(["field_3"]);
        let r = row("a", "b", 10);

        let (sql, args) = crate::build!(
            "UPDATE t SET",
            sets.format_update_sets(&r).unwrap(),
            "WHERE",
            keys.format_update_sets(&r).unwrap(),
        );

        assert_eq!(sql, "UPDATE t SET field_1=?,field_2=? WHERE field_3=10");
        assert_eq!(args, vec![text("a"), text("b")]);
        assert_eq!(
            Expression::new(sql, args).render_chunk().preview(),
            "UPDATE t SET field_1='a',field_2='b' WHERE field_3=10"
        );
    }
}
