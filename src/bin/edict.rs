fn main() {
    edict::cli::run();
}
