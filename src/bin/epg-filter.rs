fn main() -> anyhow::Result<()> {
    iptv_filter::run_epg()
}
