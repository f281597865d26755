use super::*;
use crate::dialect::Sqlite;
use crate::expr::{Assignable, assign, avg, col, count, max, not, raw};
use crate::model::ModelOpt;
use crate::query::QueryBuilder;
use crate::{AccessorKind, Entity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Entity, Serialize, Deserialize)]
struct TestModel {
    id: i64,
    first_name: String,
    age: i8,
    last_name: Option<String>,
}

#[derive(Debug, Default, Entity, Serialize, Deserialize)]
struct Order {
    id: i64,
    using_col1: String,
    using_col2: String,
}

#[derive(Debug, Default, Entity, Serialize, Deserialize)]
struct OrderDetail {
    order_id: i64,
    item_id: i64,
    using_col1: String,
    using_col2: String,
}

#[derive(Debug, Default, Entity, Serialize, Deserialize)]
struct Item {
    id: i64,
}

#[derive(Debug, Default, Entity, Serialize, Deserialize)]
struct Abc {
    a: i64,
    b: i64,
    c: i64,
}

fn tom() -> TestModel {
    TestModel {
        id: 12,
        first_name: "Tom".to_string(),
        age: 18,
        last_name: Some("Jerry".to_string()),
    }
}

fn sqlite() -> Core {
    Core::new(Arc::new(Sqlite))
}

// ── SELECT ──────────────────────────────────────────────────────────────────

#[test]
fn test_select_all() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core).build().unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model`;");
    assert!(q.args.is_empty());

    let q = Selector::<TestModel>::new(&core)
        .from(Table::of::<TestModel>())
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model`;");
}

#[test]
fn test_select_from_aliased_table() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .from(Table::of::<TestModel>().alias("t1"))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model` AS `t1`;");
}

#[test]
fn test_select_columns() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .select(col("id"))
        .select(col("first_name").alias("name"))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT `id`,`first_name` AS `name` FROM `test_model`;");

    // `columns` replaces what `select` accumulated.
    let q = Selector::<TestModel>::new(&core)
        .select(col("id"))
        .columns([col("age"), col("last_name")])
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT `age`,`last_name` FROM `test_model`;");
}

#[test]
fn test_select_aggregates() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .select(avg("age").alias("avg_age"))
        .select(count("id"))
        .select(max("age"))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT AVG(`age`) AS `avg_age`,COUNT(`id`),MAX(`age`) FROM `test_model`;"
    );
}

#[test]
fn test_select_raw_column() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .select(raw("`age` + ?", [1]))
        .select(col("id"))
        .and_where(col("id").eq(5))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT `age` + ?,`id` FROM `test_model` WHERE `id` = ?;");
    assert_eq!(q.args, vec![Value::Int(1), Value::Int(5)]);
}

#[test]
fn test_select_where_single() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .and_where(col("id").eq(1))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model` WHERE `id` = ?;");
    assert_eq!(q.args, vec![Value::Int(1)]);
}

#[test]
fn test_select_where_parenthesizes_nested_predicates() {
    let core = Core::default();
    let q = Selector::<Abc>::new(&core)
        .and_where(col("a").eq(1).or(col("b").eq(2)))
        .and_where(col("c").eq(3))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM `abc` WHERE ((`a` = ?) OR (`b` = ?)) AND (`c` = ?);"
    );
    assert_eq!(q.args, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
}

#[test]
fn test_select_where_list_equals_explicit_and() {
    let core = Core::default();
    let listed = Selector::<Abc>::new(&core)
        .where_all([col("a").eq(1), col("b").lt(2), col("c").gt(3)])
        .build()
        .unwrap();
    let folded = Selector::<Abc>::new(&core)
        .and_where(col("a").eq(1).and(col("b").lt(2)).and(col("c").gt(3)))
        .build()
        .unwrap();
    assert_eq!(listed, folded);
    assert_eq!(
        listed.sql,
        "SELECT * FROM `abc` WHERE ((`a` = ?) AND (`b` < ?)) AND (`c` > ?);"
    );
}

#[test]
fn test_select_where_not() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .and_where(not(col("age").gt(18)))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model` WHERE NOT (`age` > ?);");
}

#[test]
fn test_select_where_column_against_column() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .and_where(col("age").gt(col("id")))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model` WHERE `age` > `id`;");
    assert!(q.args.is_empty());
}

#[test]
fn test_select_where_raw_predicate() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .and_where(raw("`age` < ?", [18]).as_predicate())
        .and_where(col("first_name").eq("Tom"))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM `test_model` WHERE (`age` < ?) AND (`first_name` = ?);"
    );
    assert_eq!(q.args, vec![Value::Int(18), Value::from("Tom")]);
}

#[test]
fn test_select_where_null_argument() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .and_where(col("last_name").eq(None::<String>))
        .build()
        .unwrap();
    assert_eq!(q.args, vec![Value::Null]);
}

#[test]
fn test_select_group_by_having() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .select(col("first_name"))
        .select(avg("age").alias("avg_age"))
        .group_by(col("first_name"))
        .having(avg("age").gt(18))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `first_name`,AVG(`age`) AS `avg_age` FROM `test_model` \
         GROUP BY `first_name` HAVING AVG(`age`) > ?;"
    );
    assert_eq!(q.args, vec![Value::Int(18)]);
}

#[test]
fn test_select_group_by_multiple_columns() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .group_by(col("first_name"))
        .group_by(col("last_name"))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM `test_model` GROUP BY `first_name`,`last_name`;"
    );
}

#[test]
fn test_select_group_by_rejects_non_columns() {
    let core = Core::default();
    let err = Selector::<TestModel>::new(&core)
        .group_by(avg("age"))
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedExpressionType(_)));
}

#[test]
fn test_select_order_by() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .order_by(col("age").asc())
        .order_by(col("id").desc())
        .order_by(col("first_name"))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM `test_model` ORDER BY `age` ASC,`id` DESC,`first_name` ASC;"
    );
}

#[test]
fn test_select_limit_offset() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .limit(10)
        .offset(20)
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model` LIMIT ? OFFSET ?;");
    assert_eq!(q.args, vec![Value::Int(10), Value::Int(20)]);

    let q = Selector::<TestModel>::new(&core)
        .limit(0)
        .offset(-1)
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `test_model`;");
    assert!(q.args.is_empty());
}

#[test]
fn test_select_clause_order() {
    let core = Core::default();
    let q = Selector::<TestModel>::new(&core)
        .select(col("first_name"))
        .and_where(col("age").gt(10))
        .group_by(col("first_name"))
        .having(count("id").gt(1))
        .order_by(col("first_name").desc())
        .limit(5)
        .offset(10)
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `first_name` FROM `test_model` WHERE `age` > ? GROUP BY `first_name` \
         HAVING COUNT(`id`) > ? ORDER BY `first_name` DESC LIMIT ? OFFSET ?;"
    );
    assert_eq!(
        q.args,
        vec![Value::Int(10), Value::Int(1), Value::Int(5), Value::Int(10)]
    );
}

#[test]
fn test_select_unknown_field() {
    let core = Core::default();
    let unknown = || OrmError::UnknownField("invalid".to_string());

    let err = Selector::<TestModel>::new(&core)
        .select(col("invalid"))
        .build()
        .unwrap_err();
    assert_eq!(err, unknown());

    let err = Selector::<TestModel>::new(&core)
        .and_where(col("invalid").eq(1))
        .build()
        .unwrap_err();
    assert_eq!(err, unknown());

    let err = Selector::<TestModel>::new(&core)
        .select(avg("invalid"))
        .build()
        .unwrap_err();
    assert_eq!(err, unknown());

    let err = Selector::<TestModel>::new(&core)
        .having(max("invalid").lt(1))
        .build()
        .unwrap_err();
    assert_eq!(err, unknown());

    let err = Selector::<TestModel>::new(&core)
        .order_by(col("invalid"))
        .build()
        .unwrap_err();
    assert_eq!(err, unknown());
}

#[test]
fn test_select_uses_registered_column_names() {
    let registry = Arc::new(Registry::new());
    registry
        .register::<TestModel>([
            ModelOpt::table_name("people"),
            ModelOpt::column_name("first_name", "given_name"),
        ])
        .unwrap();
    let core = Core::default().with_registry(registry);

    let q = Selector::<TestModel>::new(&core)
        .select(col("first_name"))
        .and_where(col("first_name").eq("Tom"))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `given_name` FROM `people` WHERE `given_name` = ?;"
    );
}

// ── JOIN ────────────────────────────────────────────────────────────────────

#[test]
fn test_join_on() {
    let core = Core::default();
    let t1 = Table::of::<Order>();
    let t2 = Table::of::<OrderDetail>();
    let join = t1
        .clone()
        .join(t2.clone())
        .on([t1.c("id").eq(t2.c("order_id"))]);
    let q = Selector::<Order>::new(&core).from(join).build().unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM (`order` JOIN `order_detail` ON `order`.`id` = `order_detail`.`order_id`);"
    );
}

#[test]
fn test_join_aliases() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let join = t1
        .clone()
        .left_join(t2.clone())
        .on([t1.c("id").eq(t2.c("order_id"))]);
    let q = Selector::<Order>::new(&core)
        .select(t1.c("id"))
        .select(t2.c("item_id").alias("item"))
        .from(join)
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `t1`.`id`,`t2`.`item_id` AS `item` FROM \
         (`order` AS `t1` LEFT JOIN `order_detail` AS `t2` ON `t1`.`id` = `t2`.`order_id`);"
    );
}

#[test]
fn test_join_using() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let join = t1.join(t2).using(["using_col1", "using_col2"]);
    let q = Selector::<Order>::new(&core).from(join).build().unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM (`order` AS `t1` JOIN `order_detail` AS `t2` USING (`using_col1`,`using_col2`));"
    );
}

#[test]
fn test_join_multiple_on_predicates() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let join = t1.clone().join(t2.clone()).on([
        t1.c("id").eq(t2.c("order_id")),
        t1.c("using_col1").eq(t2.c("using_col1")),
    ]);
    let q = Selector::<Order>::new(&core).from(join).build().unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM (`order` AS `t1` JOIN `order_detail` AS `t2` ON \
         (`t1`.`id` = `t2`.`order_id`) AND (`t1`.`using_col1` = `t2`.`using_col1`));"
    );
}

#[test]
fn test_join_three_tables() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let t3 = Table::of::<Item>().alias("t3");
    let j1 = t1
        .clone()
        .join(t2.clone())
        .on([t1.c("id").eq(t2.c("order_id"))]);
    let j2 = j1
        .right_join(t3.clone())
        .on([t2.c("item_id").eq(t3.c("id"))]);
    let q = Selector::<Order>::new(&core).from(j2).build().unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM ((`order` AS `t1` JOIN `order_detail` AS `t2` ON `t1`.`id` = `t2`.`order_id`) \
         RIGHT JOIN `item` AS `t3` ON `t2`.`item_id` = `t3`.`id`);"
    );
}

#[test]
fn test_join_with_join_on_the_right() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let t3 = Table::of::<Item>().alias("t3");
    let inner = t2
        .clone()
        .join(t3.clone())
        .on([t2.c("item_id").eq(t3.c("id"))]);
    let outer = t1.clone().join(inner).on([t1.c("id").eq(t2.c("order_id"))]);
    let q = Selector::<Order>::new(&core).from(outer).build().unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM (`order` AS `t1` JOIN (`order_detail` AS `t2` JOIN `item` AS `t3` \
         ON `t2`.`item_id` = `t3`.`id`) ON `t1`.`id` = `t2`.`order_id`);"
    );
}

#[test]
fn test_join_qualifies_unqualified_columns() {
    let core = Core::default();
    let t1 = Table::of::<Order>().alias("t1");
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let join = t1
        .clone()
        .join(t2.clone())
        .on([col("id").eq(t2.c("order_id"))]);
    let q = Selector::<Order>::new(&core)
        .select(col("using_col1"))
        .select(count("id").alias("n"))
        .from(join)
        .and_where(col("id").eq(1))
        .group_by(col("using_col1"))
        .order_by(col("id").desc())
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `t1`.`using_col1`,COUNT(`t1`.`id`) AS `n` FROM \
         (`order` AS `t1` JOIN `order_detail` AS `t2` ON `t1`.`id` = `t2`.`order_id`) \
         WHERE `t1`.`id` = ? GROUP BY `t1`.`using_col1` ORDER BY `t1`.`id` DESC;"
    );
    assert_eq!(q.args, vec![Value::Int(1)]);
}

#[test]
fn test_join_qualifies_with_table_name() {
    let core = Core::default();
    let t2 = Table::of::<OrderDetail>();
    let join = t2
        .clone()
        .join(Table::of::<Order>())
        .using(["using_col1"]);
    let q = Selector::<Order>::new(&core)
        .from(join)
        .and_where(col("id").eq(1))
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM (`order_detail` JOIN `order` USING (`using_col1`)) WHERE `order`.`id` = ?;"
    );
}

#[test]
fn test_join_without_primary_table() {
    let core = Core::default();
    let t2 = Table::of::<OrderDetail>().alias("t2");
    let t3 = Table::of::<Item>().alias("t3");
    let join = t2
        .clone()
        .join(t3.clone())
        .on([t2.c("item_id").eq(t3.c("id"))]);

    // Fully qualified statements are fine.
    let q = Selector::<Order>::new(&core)
        .select(t3.c("id"))
        .from(join.clone())
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT `t3`.`id` FROM (`order_detail` AS `t2` JOIN `item` AS `t3` ON `t2`.`item_id` = `t3`.`id`);"
    );

    let err = Selector::<Order>::new(&core)
        .from(join)
        .and_where(col("id").eq(1))
        .build()
        .unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedExpressionType(_)), "{err}");
}

#[test]
fn test_single_table_columns_stay_bare() {
    let core = Core::default();
    let q = Selector::<Order>::new(&core)
        .from(Table::of::<Order>().alias("o"))
        .and_where(col("id").eq(1))
        .build()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM `order` AS `o` WHERE `id` = ?;");
}

#[test]
fn test_join_unknown_field() {
    let core = Core::default();
    let t1 = Table::of::<Order>();
    let t2 = Table::of::<OrderDetail>();

    let join = t1
        .clone()
        .join(t2.clone())
        .on([t1.c("invalid").eq(t2.c("order_id"))]);
    let err = Selector::<Order>::new(&core).from(join).build().unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));

    let join = t1.join(t2).using(["invalid"]);
    let err = Selector::<Order>::new(&core).from(join).build().unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));
}

// ── INSERT ──────────────────────────────────────────────────────────────────

#[test]
fn test_insert_single() {
    let core = Core::default();
    let q = Inserter::<TestModel>::new(&core).value(tom()).build().unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?);"
    );
    assert_eq!(
        q.args,
        vec![
            Value::Int(12),
            Value::from("Tom"),
            Value::Int(18),
            Value::from("Jerry"),
        ]
    );
}

#[test]
fn test_insert_null_field() {
    let core = Core::default();
    let record = TestModel {
        last_name: None,
        ..tom()
    };
    let q = Inserter::<TestModel>::new(&core).value(record).build().unwrap();
    assert_eq!(q.args[3], Value::Null);
}

#[test]
fn test_insert_multiple() {
    let core = Core::default();
    let second = TestModel {
        id: 13,
        first_name: "DaMing".to_string(),
        age: 19,
        last_name: None,
    };
    let q = Inserter::<TestModel>::new(&core)
        .values([tom(), second])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?),(?,?,?,?);"
    );
    assert_eq!(q.args.len(), 8);
    assert_eq!(q.args[4], Value::Int(13));
    assert_eq!(q.args[7], Value::Null);
}

#[test]
fn test_insert_selected_columns() {
    let core = Core::default();
    let q = Inserter::<TestModel>::new(&core)
        .columns(["last_name", "first_name"])
        .value(tom())
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`last_name`,`first_name`) VALUES (?,?);"
    );
    assert_eq!(q.args, vec![Value::from("Jerry"), Value::from("Tom")]);
}

#[test]
fn test_insert_unknown_column() {
    let core = Core::default();
    let err = Inserter::<TestModel>::new(&core)
        .columns(["invalid"])
        .value(tom())
        .build()
        .unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));
}

#[test]
fn test_insert_empty() {
    let core = Core::default();
    let err = Inserter::<TestModel>::new(&core).build().unwrap_err();
    assert_eq!(err, OrmError::EmptyInsert);
}

#[test]
fn test_insert_accessors_agree() {
    let direct = Core::default().with_accessor(AccessorKind::Direct);
    let reflect = Core::default().with_accessor(AccessorKind::Reflect);
    let a = Inserter::<TestModel>::new(&direct).value(tom()).build().unwrap();
    let b = Inserter::<TestModel>::new(&reflect).value(tom()).build().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_upsert_mysql_assignments() {
    let core = Core::default();
    let q = Inserter::<TestModel>::new(&core)
        .value(tom())
        .on_duplicate_key()
        .update([assign("first_name", "Deng"), assign("age", 19)])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) \
         ON DUPLICATE KEY UPDATE `first_name`=?,`age`=?;"
    );
    assert_eq!(q.args.len(), 6);
    assert_eq!(q.args[4], Value::from("Deng"));
    assert_eq!(q.args[5], Value::Int(19));
}

#[test]
fn test_upsert_mysql_columns() {
    let core = Core::default();
    let q = Inserter::<TestModel>::new(&core)
        .value(tom())
        .on_duplicate_key()
        .update([col("first_name"), col("age")])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) \
         ON DUPLICATE KEY UPDATE `first_name`=VALUES(`first_name`),`age`=VALUES(`age`);"
    );
    assert_eq!(q.args.len(), 4);
}

#[test]
fn test_upsert_sqlite() {
    let core = sqlite();
    let q = Inserter::<TestModel>::new(&core)
        .value(tom())
        .on_duplicate_key()
        .conflict_columns(["id"])
        .update([assign("first_name", "Deng"), Assignable::from(col("age"))])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) \
         ON CONFLICT(`id`) DO UPDATE SET `first_name`=?,`age`=excluded.`age`;"
    );
    assert_eq!(q.args[4], Value::from("Deng"));
}

#[test]
fn test_upsert_same_value_renders_per_dialect() {
    let upsert = Upsert::new([col("age")]).conflict_columns(["id", "first_name"]);

    let mysql = Core::default();
    let q = Inserter::<TestModel>::new(&mysql)
        .value(tom())
        .upsert(upsert.clone())
        .build()
        .unwrap();
    assert!(q.sql.ends_with(" ON DUPLICATE KEY UPDATE `age`=VALUES(`age`);"));

    let sqlite = sqlite();
    let q = Inserter::<TestModel>::new(&sqlite)
        .value(tom())
        .upsert(upsert)
        .build()
        .unwrap();
    assert!(q.sql.ends_with(
        " ON CONFLICT(`id`,`first_name`) DO UPDATE SET `age`=excluded.`age`;"
    ));
}

#[test]
fn test_upsert_unknown_field() {
    let core = Core::default();
    let err = Inserter::<TestModel>::new(&core)
        .value(tom())
        .on_duplicate_key()
        .update([assign("invalid", 1)])
        .build()
        .unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));

    let core = sqlite();
    let err = Inserter::<TestModel>::new(&core)
        .value(tom())
        .on_duplicate_key()
        .conflict_columns(["invalid"])
        .update([col("age")])
        .build()
        .unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));
}

#[test]
fn test_upsert_rejects_qualified_column() {
    for core in [Core::default(), sqlite()] {
        let err = Inserter::<TestModel>::new(&core)
            .value(tom())
            .on_duplicate_key()
            .update([Table::of::<TestModel>().c("age")])
            .build()
            .unwrap_err();
        assert!(matches!(err, OrmError::UnsupportedAssignableType(_)));
    }
}

// ── DELETE ──────────────────────────────────────────────────────────────────

#[test]
fn test_delete_all() {
    let core = Core::default();
    let q = Deleter::<TestModel>::new(&core).build().unwrap();
    assert_eq!(q.sql, "DELETE FROM `test_model`;");
    assert!(q.args.is_empty());
}

#[test]
fn test_delete_where() {
    let core = Core::default();
    let q = Deleter::<TestModel>::new(&core)
        .and_where(col("id").eq(12))
        .build()
        .unwrap();
    assert_eq!(q.sql, "DELETE FROM `test_model` WHERE `id` = ?;");
    assert_eq!(q.args, vec![Value::Int(12)]);

    let q = Deleter::<TestModel>::new(&core)
        .where_all([col("id").gt(1), col("age").lt(30)])
        .build()
        .unwrap();
    assert_eq!(
        q.sql,
        "DELETE FROM `test_model` WHERE (`id` > ?) AND (`age` < ?);"
    );
}

#[test]
fn test_delete_from_table() {
    let core = Core::default();
    let q = Deleter::<TestModel>::new(&core)
        .from(Table::of::<TestModel>())
        .build()
        .unwrap();
    assert_eq!(q.sql, "DELETE FROM `test_model`;");
}

#[test]
fn test_delete_rejects_join() {
    let core = Core::default();
    let join = Table::of::<Order>()
        .join(Table::of::<OrderDetail>())
        .using(["using_col1"]);
    let err = Deleter::<Order>::new(&core).from(join).build().unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedTable(_)));
}

#[test]
fn test_delete_unknown_field() {
    let core = Core::default();
    let err = Deleter::<TestModel>::new(&core)
        .and_where(col("invalid").eq(1))
        .build()
        .unwrap_err();
    assert_eq!(err, OrmError::UnknownField("invalid".to_string()));
}

#[test]
fn test_model_errors_surface_from_build() {
    #[derive(Debug, Default, Entity, Serialize, Deserialize)]
    struct Broken {
        #[orm("column")]
        id: i64,
    }

    let core = Core::default();
    let err = Selector::<Broken>::new(&core).build().unwrap_err();
    assert_eq!(err, OrmError::InvalidTagContent("column".to_string()));
}
