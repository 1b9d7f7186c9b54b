#[test]
fn cli_behaves_as_documented() {
    trycmd::TestCases::new().case("tests/cmd/*.toml");
}
