fn main() {
    code_pills::run();
}
