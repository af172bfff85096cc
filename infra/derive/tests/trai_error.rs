#[test]
fn trai_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/trai_error_pass.rs");
    t.pass("tests/ui/trai_error_status.rs");
    t.compile_fail("tests/ui/trai_error_no_context.rs");
    t.compile_fail("tests/ui/trai_error_bad_context_type.rs");
    t.compile_fail("tests/ui/trai_error_bad_status.rs");
}
