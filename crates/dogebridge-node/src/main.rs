fn main() -> anyhow::Result<()> {
    dogebridge_node::run()
}
