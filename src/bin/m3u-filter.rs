fn main() -> anyhow::Result<()> {
    iptv_filter::run_m3u()
}
