//! Lists, dicts, indexing and iteration

use super::harness::*;
use sky_engine::Value;

#[test]
fn test_list_literal_and_index() {
    expect_int("let xs = [10, 20, 30]\nxs[1]\n", 20);
    expect_output("print([1, [2, 3], \"a\"])\n", "[1, [2, 3], \"a\"]\n");
}

#[test]
fn test_dict_literal_and_lookup() {
    expect_int("let ages = {\"ann\": 31, \"bob\": 27}\nages[\"bob\"]\n", 27);
    expect_output(
        "print({\"b\": 2, \"a\": \"x\"})\n",
        "{\"a\": \"x\", \"b\": 2}\n",
    );
}

#[test]
fn test_string_index() {
    expect_value("\"sky\"[2]\n", Value::string("y"));
}

#[test]
fn test_for_over_list() {
    expect_output(
        "for name in [\"a\", \"b\"]\n    print(\"hi \" + name)\nend\n",
        "hi a\nhi b\n",
    );
}

#[test]
fn test_for_over_string_characters() {
    expect_output("for c in \"héy\"\n    print(c)\nend\n", "h\né\ny\n");
}

#[test]
fn test_for_over_dict_keys_in_order() {
    let source = "\
let d = {\"z\": 1, \"a\": 2, \"m\": 3}
for k in d
    print(k + \"=\" + d[k])
end
";
    expect_output(source, "a=2\nm=3\nz=1\n");
}

#[test]
fn test_iteration_walks_a_snapshot() {
    let source = "\
let xs = [1, 2, 3]
for x in xs
    xs = [0]
    print(x)
end
print(xs)
";
    expect_output(source, "1\n2\n3\n[0]\n");
}

#[test]
fn test_index_out_of_range() {
    expect_runtime_error("let xs = [1]\nxs[3]\n", "index 3 out of range for length 1");
}

#[test]
fn test_missing_key() {
    expect_runtime_error("let d = {\"a\": 1}\nd[\"b\"]\n", "key not found: \"b\"");
}

#[test]
fn test_unhashable_key() {
    expect_runtime_error("let d = {[1]: 2}\n", "unhashable dict key of type list");
}

#[test]
fn test_iterating_a_number_fails() {
    expect_runtime_error("for x in 5\n    print(x)\nend\n", "cannot iterate over int");
}
