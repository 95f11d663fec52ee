use std::env;
use std::error::Error;
use std::path::Path;

use drawdown_guide::data_provider::{JsonSeriesStore, SeriesStore};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let ticker = args.next().unwrap_or_else(|| "QQQ".to_string()).to_uppercase();
    let data_dir = args.next().unwrap_or_else(|| "data".to_string());

    // 检查数据文件是否存在
    let store = JsonSeriesStore::new(&data_dir);
    if !store.has_series(&ticker) {
        return Err(format!(
            "{} 不存在，请先运行 'cargo run -- refresh -t {}'",
            Path::new(&data_dir).join(format!("{}.json", ticker)).display(),
            ticker
        )
        .into());
    }

    let series = store.load_series(&ticker)?;
    match series.last_date() {
        Some(date) => {
            println!("最新交易日期: {}", date);

            // 格式化为 YYYY.M.D 版本号（移除前导零）
            let formatted_version = date.format("%Y.%-m.%-d").to_string();
            println!("版本号: {}", formatted_version);
        }
        None => println!("未找到有效的日期"),
    }

    Ok(())
}
