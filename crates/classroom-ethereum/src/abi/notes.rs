//! NotesFactory and NotesContract bindings

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface NotesFactory {
        struct NotesContractInfo {
            address contractAddress;
            address owner;
            string className;
            uint256 createdAt;
        }

        event NotesContractCreated(
            address indexed notesContractAddress,
            address indexed owner,
            string className
        );

        function createNotesContract(address initialOwner, string className, address classAddress)
            external
            returns (address);
        function getNotesContracts() external view returns (NotesContractInfo[] memory);
        function getOwnerNotesContracts(address owner) external view returns (address[] memory);
        function getNotesContractForClass(address classAddress) external view returns (address);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface NotesContract {
        event NoteCreated(uint256 indexed noteId, address indexed creator, string title, uint256 price);

        function createNote(
            string title,
            string description,
            string ipfsHash,
            uint256 price,
            uint256 lectureId
        ) external returns (uint256);
        function approveNote(uint256 noteId, bool approved) external;
        function purchaseNote(uint256 noteId) external payable;
        function updateNotePrice(uint256 noteId, uint256 newPrice) external;

        function hasPurchasedNote(address user, uint256 noteId) external view returns (bool);
        function getNoteSales(uint256 noteId) external view returns (uint256);
        function getAllNotes() external view returns (uint256[] memory);
        function getApprovedNotes() external view returns (uint256[] memory);
        function getNotesForLecture(uint256 lectureId) external view returns (uint256[] memory);
        function getCreatedNotes(address creator) external view returns (uint256[] memory);
        function getPurchasedNotes(address buyer) external view returns (uint256[] memory);
        function getNoteDetails(uint256 noteId)
            external
            view
            returns (
                string memory title,
                string memory description,
                string memory ipfsHash,
                address creator,
                uint256 price,
                uint256 createdAt,
                uint256 lectureId,
                bool isApproved,
                uint256 salesCount
            );
    }
}
