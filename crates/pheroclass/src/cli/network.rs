use anyhow::Result;
use pheroclass_ethereum::PHAROS_DEVNET;

use super::Cli;

pub async fn handle_network_command(cli: &Cli) -> Result<()> {
    let config = cli.classroom_config()?;
    let classroom = cli.classroom()?;

    println!("🌐 Network");
    println!("   RPC:      {}", config.rpc_url);
    println!("   Chain id: {} (0x{:x})", config.chain_id, config.chain_id);
    if config.chain_id == PHAROS_DEVNET.chain_id {
        println!("   Name:     {}", PHAROS_DEVNET.name);
        println!("   Explorer: {}", PHAROS_DEVNET.explorer);
    }

    match classroom.verify_network().await {
        Ok(()) => println!("✅ Endpoint serves the expected chain"),
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            return Err(e.into());
        }
    }

    match classroom.account() {
        Some(account) => {
            let balance = classroom.balance(&account).await?;
            println!("👤 Account: {}", account);
            println!("💰 Balance: {} {}", balance, PHAROS_DEVNET.native_currency.symbol);
        }
        None => println!("👤 No account configured (read-only)"),
    }

    match classroom.quiz_contract_count().await {
        Ok(count) => println!("📝 Quiz contracts deployed: {}", count),
        Err(e) => eprintln!("⚠️  Could not read the quiz factory: {}", e),
    }
    Ok(())
}
