//! Contract bindings for the lending markets we read from.
//!
//! Only view functions are bound; nothing here signs or sends transactions.

use alloy::sol;

// AAVE V3 Pool interface (Spark and Radiant expose the same account view)
sol! {
    /// Aave V3 Pool interface (account view subset)
    #[sol(rpc)]
    interface IPool {
        /// Account totals in the market base currency (8 decimals),
        /// threshold/LTV in basis points, health factor in WAD.
        function getUserAccountData(address user)
            external
            view
            returns (
                uint256 totalCollateralBase,
                uint256 totalDebtBase,
                uint256 availableBorrowsBase,
                uint256 currentLiquidationThreshold,
                uint256 ltv,
                uint256 healthFactor
            );
    }
}

// Compound V3 Comet interface
sol! {
    /// Compound V3 Comet interface (account view subset)
    #[sol(rpc)]
    interface IComet {
        struct AssetInfo {
            uint8 offset;
            address asset;
            address priceFeed;
            uint64 scale;
            uint64 borrowCollateralFactor;
            uint64 liquidateCollateralFactor;
            uint64 liquidationFactor;
            uint128 supplyCap;
        }

        function numAssets() external view returns (uint8);
        function getAssetInfo(uint8 i) external view returns (AssetInfo memory);
        function collateralBalanceOf(address account, address asset) external view returns (uint128);
        function borrowBalanceOf(address account) external view returns (uint256);
        function baseTokenPriceFeed() external view returns (address);
        function baseScale() external view returns (uint256);
        function getPrice(address priceFeed) external view returns (uint256);
    }
}
